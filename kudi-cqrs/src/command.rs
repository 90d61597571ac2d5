//! Command handling.

use crate::RequestValidator;
use async_trait::async_trait;
use dashmap::DashMap;
use kudi_domain::{BankError, DomainEvent};
use kudi_events::EventBus;
use kudi_validation::ValidationErrors;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A state-changing request.
pub trait Command: Send + Sync + 'static {
    /// Success payload returned to the caller.
    type Output: Send + 'static;

    /// Stable name used for logging.
    fn name() -> &'static str
    where
        Self: Sized;
}

/// A handler result: the payload plus the events the unit of work committed,
/// which the pipeline publishes after the handler returns.
pub struct Executed<T> {
    pub output: T,
    pub events: Vec<DomainEvent>,
}

impl<T> Executed<T> {
    /// A result with no committed events.
    pub fn new(output: T) -> Self {
        Self {
            output,
            events: Vec::new(),
        }
    }

    /// A result carrying committed events for post-commit dispatch.
    pub fn with_events(output: T, events: Vec<DomainEvent>) -> Self {
        Self { output, events }
    }
}

/// Handler for one command type.
#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    async fn handle(&self, command: C) -> Result<Executed<C::Output>, BankError>;
}

#[async_trait]
trait DynCommandHandler: Send + Sync {
    async fn handle_dyn(
        &self,
        command: Box<dyn Any + Send>,
    ) -> Result<(Box<dyn Any + Send>, Vec<DomainEvent>), BankError>;
}

struct TypedCommandHandler<C: Command, H: CommandHandler<C>> {
    handler: H,
    _phantom: std::marker::PhantomData<fn(C)>,
}

#[async_trait]
impl<C: Command, H: CommandHandler<C>> DynCommandHandler for TypedCommandHandler<C, H> {
    async fn handle_dyn(
        &self,
        command: Box<dyn Any + Send>,
    ) -> Result<(Box<dyn Any + Send>, Vec<DomainEvent>), BankError> {
        match command.downcast::<C>() {
            Ok(command) => {
                let executed = self.handler.handle(*command).await?;
                Ok((Box::new(executed.output), executed.events))
            }
            Err(_) => Err(BankError::Internal("command type mismatch".into())),
        }
    }
}

trait DynRequestValidator: Send + Sync {
    fn validate_dyn(&self, request: &(dyn Any + Send)) -> Result<(), ValidationErrors>;
}

struct TypedRequestValidator<R, V: RequestValidator<R>> {
    validator: V,
    _phantom: std::marker::PhantomData<fn(&R)>,
}

impl<R: Send + 'static, V: RequestValidator<R>> DynRequestValidator for TypedRequestValidator<R, V> {
    fn validate_dyn(&self, request: &(dyn Any + Send)) -> Result<(), ValidationErrors> {
        match request.downcast_ref::<R>() {
            Some(request) => self.validator.validate(request),
            None => Ok(()),
        }
    }
}

/// Routes commands to their registered handler through the pipeline stages.
pub struct CommandBus {
    handlers: DashMap<TypeId, Arc<dyn DynCommandHandler>>,
    validators: DashMap<TypeId, Arc<dyn DynRequestValidator>>,
    events: EventBus,
}

impl CommandBus {
    pub fn new(events: EventBus) -> Self {
        Self {
            handlers: DashMap::new(),
            validators: DashMap::new(),
            events,
        }
    }

    /// Register the handler for a command type.
    pub fn register<C, H>(&self, handler: H)
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        self.handlers.insert(
            TypeId::of::<C>(),
            Arc::new(TypedCommandHandler {
                handler,
                _phantom: std::marker::PhantomData,
            }),
        );
    }

    /// Register the declarative validator for a command type.
    pub fn register_validator<C, V>(&self, validator: V)
    where
        C: Command,
        V: RequestValidator<C> + 'static,
    {
        self.validators.insert(
            TypeId::of::<C>(),
            Arc::new(TypedRequestValidator {
                validator,
                _phantom: std::marker::PhantomData,
            }),
        );
    }

    /// Execute a command through logging, validation, the handler, and
    /// post-commit event dispatch.
    pub async fn execute<C: Command>(&self, command: C) -> Result<C::Output, BankError> {
        let name = C::name();
        debug!(command = name, "executing command");

        if let Some(validator) = self.validators.get(&TypeId::of::<C>()) {
            if let Err(violations) = validator.validate_dyn(&command) {
                warn!(
                    command = name,
                    violations = violations.len(),
                    "command rejected by validation"
                );
                return Err(BankError::Validation(violations));
            }
        }

        let handler = self
            .handlers
            .get(&TypeId::of::<C>())
            .ok_or_else(|| BankError::Internal(format!("no handler registered for {name}")))?
            .clone();

        let boxed: Box<dyn Any + Send> = Box::new(command);
        match handler.handle_dyn(boxed).await {
            Ok((output, events)) => {
                // Post-commit stage: the events are already durable in the
                // outbox, so a subscriber failure is logged and swallowed.
                for event in &events {
                    if let Err(e) = self.events.publish_dyn(event.as_event()).await {
                        warn!(command = name, error = %e, "post-commit subscriber failed");
                    }
                }
                info!(command = name, events = events.len(), "command succeeded");
                output
                    .downcast::<C::Output>()
                    .map(|output| *output)
                    .map_err(|_| BankError::Internal("command output type mismatch".into()))
            }
            Err(e) => {
                info!(command = name, error = %e, "command failed");
                Err(e)
            }
        }
    }

    /// The bus events are published on.
    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kudi_validation::ValidationError;

    struct RenameThing {
        name: String,
    }

    impl Command for RenameThing {
        type Output = String;

        fn name() -> &'static str {
            "RenameThing"
        }
    }

    struct RenameThingHandler;

    #[async_trait]
    impl CommandHandler<RenameThing> for RenameThingHandler {
        async fn handle(&self, command: RenameThing) -> Result<Executed<String>, BankError> {
            Ok(Executed::new(format!("renamed to {}", command.name)))
        }
    }

    struct RenameThingValidator;

    impl RequestValidator<RenameThing> for RenameThingValidator {
        fn validate(&self, request: &RenameThing) -> Result<(), ValidationErrors> {
            let mut errors = ValidationErrors::new();
            if request.name.is_empty() {
                errors.add(ValidationError::new("name", "name should not be empty"));
            }
            if request.name.len() > 16 {
                errors.add(ValidationError::new("name", "name is too long"));
            }
            errors.into_result()
        }
    }

    #[tokio::test]
    async fn test_execute_routes_to_handler() {
        let bus = CommandBus::new(EventBus::new());
        bus.register::<RenameThing, _>(RenameThingHandler);

        let output = bus
            .execute(RenameThing { name: "ledger".into() })
            .await
            .unwrap();
        assert_eq!(output, "renamed to ledger");
    }

    #[tokio::test]
    async fn test_validation_short_circuits_with_all_violations() {
        let bus = CommandBus::new(EventBus::new());
        bus.register::<RenameThing, _>(RenameThingHandler);
        bus.register_validator::<RenameThing, _>(RenameThingValidator);

        let result = bus.execute(RenameThing { name: String::new() }).await;
        match result {
            Err(BankError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_valid_command_passes_validator() {
        let bus = CommandBus::new(EventBus::new());
        bus.register::<RenameThing, _>(RenameThingHandler);
        bus.register_validator::<RenameThing, _>(RenameThingValidator);

        assert!(bus.execute(RenameThing { name: "ok".into() }).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_handler_is_internal_error() {
        let bus = CommandBus::new(EventBus::new());
        let result = bus.execute(RenameThing { name: "x".into() }).await;
        assert!(matches!(result, Err(BankError::Internal(_))));
    }
}
