//! The composition root.
//!
//! Everything is wired explicitly here: repositories, buses, handlers,
//! validators, the outbox relay, and the job runtime. No registration is
//! discovered by reflection.

use kudi_app::{
    CreateAccount, CreateAccountHandler, CreateAccountValidator, CreateCustomer,
    CreateCustomerHandler, CreateCustomerValidator, DepositMoney, DepositMoneyHandler,
    EventAuditLog,
    GetAccountDetails, GetAccountDetailsHandler, GetCustomerDetails, GetCustomerDetailsHandler,
    GetCustomers, GetCustomersHandler, GetTransactionHistory, GetTransactionHistoryHandler,
    MoveMoneyRules, TransferMoney, TransferMoneyHandler, WithdrawMoney, WithdrawMoneyHandler,
};
use kudi_config::AppConfig;
use kudi_cqrs::{CommandBus, QueryBus};
use kudi_domain::BankError;
use kudi_events::EventBus;
use kudi_jobs::{
    register_job_handlers, register_recurring_jobs, InterestJob, JobContext, MaintenanceJob,
    StatementJob, TextStatementRenderer,
};
use kudi_mail::EmailService;
use kudi_outbox::{OutboxRelay, OutboxStore, RelayConfig};
use kudi_persistence::{
    connect, migrate, AccountRepository, CustomerRepository, TransactionRepository,
};
use kudi_scheduler::{
    Dashboard, JobStore, RecurringScheduler, RecurringStore, WorkerPool, WorkerPoolConfig,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// The assembled service: buses for callers, background tasks for the
/// outbox relay and the job runtime.
pub struct BankingRuntime {
    pool: PgPool,
    config: AppConfig,
    event_bus: EventBus,
    commands: Arc<CommandBus>,
    queries: Arc<QueryBus>,
    relay: OutboxRelay,
    workers: WorkerPool,
    recurring: RecurringStore,
    recurring_scheduler: RecurringScheduler,
    dashboard: Dashboard,
}

impl BankingRuntime {
    /// Connect, migrate, and wire the whole service. Background tasks are
    /// not started yet; subscribe any event handlers on
    /// [`Self::event_bus`], then call [`Self::start`].
    pub async fn bootstrap(
        config: AppConfig,
        mailer: Arc<dyn EmailService>,
    ) -> Result<Self, BankError> {
        config
            .validate()
            .map_err(|e| BankError::Internal(e.to_string()))?;

        let pool = connect(&config.database).await?;
        migrate(&pool).await?;

        let customers = CustomerRepository::new(pool.clone());
        let accounts = AccountRepository::new(pool.clone());
        let transactions = TransactionRepository::new(pool.clone());

        let event_bus = EventBus::new();
        EventAuditLog::subscribe_all(&event_bus);

        let commands = CommandBus::new(event_bus.clone());
        commands.register::<CreateCustomer, _>(CreateCustomerHandler::new(
            customers.clone(),
            pool.clone(),
        ));
        commands.register_validator::<CreateCustomer, _>(CreateCustomerValidator);
        commands.register::<CreateAccount, _>(CreateAccountHandler::new(
            customers.clone(),
            accounts.clone(),
            pool.clone(),
        ));
        commands.register_validator::<CreateAccount, _>(CreateAccountValidator);
        commands.register::<TransferMoney, _>(TransferMoneyHandler::new(
            accounts.clone(),
            pool.clone(),
        ));
        commands.register_validator::<TransferMoney, _>(MoveMoneyRules);
        commands.register::<DepositMoney, _>(DepositMoneyHandler::new(
            accounts.clone(),
            pool.clone(),
        ));
        commands.register_validator::<DepositMoney, _>(MoveMoneyRules);
        commands.register::<WithdrawMoney, _>(WithdrawMoneyHandler::new(
            accounts.clone(),
            pool.clone(),
        ));
        commands.register_validator::<WithdrawMoney, _>(MoveMoneyRules);

        let queries = QueryBus::new();
        queries.register::<GetAccountDetails, _>(GetAccountDetailsHandler::new(
            accounts.clone(),
            customers.clone(),
        ));
        queries.register::<GetTransactionHistory, _>(GetTransactionHistoryHandler::new(
            transactions.clone(),
        ));
        queries.register::<GetCustomers, _>(GetCustomersHandler::new(customers.clone()));
        queries.register::<GetCustomerDetails, _>(GetCustomerDetailsHandler::new(
            customers.clone(),
            accounts.clone(),
        ));

        let relay = OutboxRelay::new(
            OutboxStore::new(pool.clone()),
            event_bus.clone(),
            RelayConfig {
                poll_interval: config.outbox.poll_interval(),
                batch_size: config.outbox.batch_size,
                max_retries: config.outbox.max_retries,
            },
        );

        let mut workers = WorkerPool::new(
            pool.clone(),
            WorkerPoolConfig {
                worker_count: config.scheduler.worker_count,
                invisibility_timeout: config.scheduler.invisibility_timeout(),
                ..WorkerPoolConfig::default()
            },
        );

        let statements = Arc::new(StatementJob::new(
            accounts.clone(),
            customers.clone(),
            transactions.clone(),
            Arc::new(TextStatementRenderer::new()),
            mailer.clone(),
        ));
        let interest = Arc::new(InterestJob::new(
            accounts.clone(),
            transactions.clone(),
            mailer.clone(),
            pool.clone(),
        ));
        let maintenance = Arc::new(MaintenanceJob::new(accounts.clone(), transactions.clone()));
        register_job_handlers(
            &mut workers,
            JobContext {
                statements,
                interest,
                maintenance,
            },
        );

        let recurring = RecurringStore::new(pool.clone());
        let recurring_scheduler = RecurringScheduler::new(
            recurring.clone(),
            JobStore::new(pool.clone()),
            Duration::from_secs(30),
            config.scheduler.retry_attempts,
        );
        let dashboard = Dashboard::new(pool.clone());

        Ok(Self {
            pool,
            config,
            event_bus,
            commands: Arc::new(commands),
            queries: Arc::new(queries),
            relay,
            workers,
            recurring,
            recurring_scheduler,
            dashboard,
        })
    }

    /// Write the recurring-job registrations and start the background
    /// tasks: outbox relay, worker pool, recurring scheduler.
    pub async fn start(&mut self) -> Result<(), BankError> {
        register_recurring_jobs(&self.recurring, &self.config.scheduler)
            .await
            .map_err(|e| BankError::Internal(e.to_string()))?;

        self.relay
            .start()
            .map_err(|e| BankError::Internal(e.to_string()))?;
        self.workers
            .start()
            .await
            .map_err(|e| BankError::Internal(e.to_string()))?;
        self.recurring_scheduler
            .start()
            .map_err(|e| BankError::Internal(e.to_string()))?;

        info!("banking runtime started");
        Ok(())
    }

    /// Stop the background tasks. In-flight batches and jobs complete.
    pub async fn shutdown(&mut self) -> Result<(), BankError> {
        self.recurring_scheduler
            .stop()
            .await
            .map_err(|e| BankError::Internal(e.to_string()))?;
        self.workers
            .stop()
            .await
            .map_err(|e| BankError::Internal(e.to_string()))?;
        self.relay
            .stop()
            .await
            .map_err(|e| BankError::Internal(e.to_string()))?;

        info!("banking runtime stopped");
        Ok(())
    }

    /// The command side of the API.
    pub fn commands(&self) -> &CommandBus {
        &self.commands
    }

    /// The query side of the API.
    pub fn queries(&self) -> &QueryBus {
        &self.queries
    }

    /// The in-process event bus; subscribe handlers before `start`.
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// The scheduler monitoring surface.
    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// Fire one execution of a recurring job now.
    pub async fn trigger_recurring(&self, recurring_id: &str) -> Result<(), BankError> {
        self.recurring_scheduler
            .trigger(recurring_id)
            .await
            .map(|_| ())
            .map_err(|e| BankError::Internal(e.to_string()))
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
