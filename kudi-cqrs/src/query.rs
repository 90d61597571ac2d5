//! Query handling.

use crate::RequestValidator;
use async_trait::async_trait;
use dashmap::DashMap;
use kudi_domain::BankError;
use kudi_validation::ValidationErrors;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A read-only request returning a projection.
pub trait Query: Send + Sync + 'static {
    /// Projection DTO returned to the caller.
    type Output: Send + 'static;

    /// Stable name used for logging.
    fn name() -> &'static str
    where
        Self: Sized;
}

/// Handler for one query type.
#[async_trait]
pub trait QueryHandler<Q: Query>: Send + Sync {
    async fn handle(&self, query: Q) -> Result<Q::Output, BankError>;
}

#[async_trait]
trait DynQueryHandler: Send + Sync {
    async fn handle_dyn(&self, query: Box<dyn Any + Send>)
        -> Result<Box<dyn Any + Send>, BankError>;
}

struct TypedQueryHandler<Q: Query, H: QueryHandler<Q>> {
    handler: H,
    _phantom: std::marker::PhantomData<fn(Q)>,
}

#[async_trait]
impl<Q: Query, H: QueryHandler<Q>> DynQueryHandler for TypedQueryHandler<Q, H> {
    async fn handle_dyn(
        &self,
        query: Box<dyn Any + Send>,
    ) -> Result<Box<dyn Any + Send>, BankError> {
        match query.downcast::<Q>() {
            Ok(query) => {
                let output = self.handler.handle(*query).await?;
                Ok(Box::new(output))
            }
            Err(_) => Err(BankError::Internal("query type mismatch".into())),
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

/// Routes queries to their registered handler through logging and
/// validation.
pub struct QueryBus {
    handlers: DashMap<TypeId, Arc<dyn DynQueryHandler>>,
    validators: DashMap<TypeId, Arc<dyn DynRequestValidator>>,
}

impl QueryBus {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
            validators: DashMap::new(),
        }
    }

    /// Register the handler for a query type.
    pub fn register<Q, H>(&self, handler: H)
    where
        Q: Query,
        H: QueryHandler<Q> + 'static,
    {
        self.handlers.insert(
            TypeId::of::<Q>(),
            Arc::new(TypedQueryHandler {
                handler,
                _phantom: std::marker::PhantomData,
            }),
        );
    }

    /// Register the declarative validator for a query type.
    pub fn register_validator<Q, V>(&self, validator: V)
    where
        Q: Query,
        V: RequestValidator<Q> + 'static,
    {
        self.validators.insert(
            TypeId::of::<Q>(),
            Arc::new(TypedRequestValidator {
                validator,
                _phantom: std::marker::PhantomData,
            }),
        );
    }

    /// Execute a query through logging, validation, and the handler.
    pub async fn execute<Q: Query>(&self, query: Q) -> Result<Q::Output, BankError> {
        let name = Q::name();
        debug!(query = name, "executing query");

        if let Some(validator) = self.validators.get(&TypeId::of::<Q>()) {
            if let Err(violations) = validator.validate_dyn(&query) {
                warn!(
                    query = name,
                    violations = violations.len(),
                    "query rejected by validation"
                );
                return Err(BankError::Validation(violations));
            }
        }

        let handler = self
            .handlers
            .get(&TypeId::of::<Q>())
            .ok_or_else(|| BankError::Internal(format!("no handler registered for {name}")))?
            .clone();

        let boxed: Box<dyn Any + Send> = Box::new(query);
        match handler.handle_dyn(boxed).await {
            Ok(output) => {
                info!(query = name, "query succeeded");
                output
                    .downcast::<Q::Output>()
                    .map(|output| *output)
                    .map_err(|_| BankError::Internal("query output type mismatch".into()))
            }
            Err(e) => {
                info!(query = name, error = %e, "query failed");
                Err(e)
            }
        }
    }
}

impl Default for QueryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountThings {
        up_to: u32,
    }

    impl Query for CountThings {
        type Output = Vec<u32>;

        fn name() -> &'static str {
            "CountThings"
        }
    }

    struct CountThingsHandler;

    #[async_trait]
    impl QueryHandler<CountThings> for CountThingsHandler {
        async fn handle(&self, query: CountThings) -> Result<Vec<u32>, BankError> {
            Ok((1..=query.up_to).collect())
        }
    }

    #[tokio::test]
    async fn test_query_routes_to_handler() {
        let bus = QueryBus::new();
        bus.register::<CountThings, _>(CountThingsHandler);

        let output = bus.execute(CountThings { up_to: 3 }).await.unwrap();
        assert_eq!(output, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_missing_handler_is_internal_error() {
        let bus = QueryBus::new();
        let result = bus.execute(CountThings { up_to: 1 }).await;
        assert!(matches!(result, Err(BankError::Internal(_))));
    }
}
