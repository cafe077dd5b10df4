//! A fluent builder for table queries.

use std::marker::PhantomData;

use query_engine_ast::ast::validate_parameter_name;
use query_engine_metadata::metadata::{schema_of, Entity, NamingPolicy};

use super::expression::{DeclaringType, Expression, MethodRef, ParameterExpression};
use super::query::{error::Error, CompileOptions, Paging};

/// The lambda parameter of a query over `T`.
pub struct Param<T> {
    parameter: ParameterExpression,
    entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Param<T> {
    pub fn new(name: &str) -> Self {
        Param {
            parameter: ParameterExpression {
                name: name.to_string(),
                ty: schema_of::<T>().clr_type(),
            },
            entity: PhantomData,
        }
    }

    pub fn expression(&self) -> Expression {
        Expression::Parameter(self.parameter.clone())
    }

    /// Read a member of the entity.
    pub fn get(&self, name: &str) -> Result<Expression, Error> {
        self.expression().get::<T>(name)
    }
}

/// Build a one-parameter lambda over `T`.
pub fn lambda<T: Entity>(
    body: impl FnOnce(&Param<T>) -> Result<Expression, Error>,
) -> Result<Expression, Error> {
    let param = Param::<T>::new("m");
    let body = body(&param)?;
    Ok(Expression::lambda(vec![param.parameter], body))
}

/// A query against the table holding `T`.
///
/// Invalid arguments are recorded as the query is built and reported when it
/// is translated.
pub struct TableQuery<T: Entity> {
    expression: Expression,
    table_name: String,
    paging: Paging,
    include_total_count: bool,
    include_deleted_items: bool,
    parameters: Vec<(String, String)>,
    options: CompileOptions,
    errors: Vec<Error>,
    entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Default for TableQuery<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> TableQuery<T> {
    pub fn new() -> Self {
        TableQuery {
            expression: Expression::source::<T>(),
            table_name: T::TABLE_NAME.to_string(),
            paging: Paging::default(),
            include_total_count: false,
            include_deleted_items: false,
            parameters: vec![],
            options: CompileOptions::default(),
            errors: vec![],
            entity: PhantomData,
        }
    }

    #[must_use]
    pub fn naming_policy(mut self, naming_policy: NamingPolicy) -> Self {
        self.options.naming_policy = naming_policy;
        self
    }

    /// Apply a query operator taking a lambda to the query built so far.
    #[must_use]
    pub fn apply(mut self, operator: &str, lambda: Expression) -> Self {
        let target = std::mem::replace(&mut self.expression, Expression::source::<T>());
        let return_type = target.ty();
        self.expression = Expression::call_static(
            MethodRef::new(DeclaringType::Queryable, operator, return_type),
            vec![target, lambda.quote()],
        );
        self
    }

    fn apply_with(
        self,
        operator: &str,
        body: impl FnOnce(&Param<T>) -> Result<Expression, Error>,
    ) -> Self {
        match lambda::<T>(body) {
            Ok(lambda) => self.apply(operator, lambda),
            Err(error) => self.record(error),
        }
    }

    fn record(mut self, error: Error) -> Self {
        self.errors.push(error);
        self
    }

    #[must_use]
    pub fn where_(self, predicate: impl FnOnce(&Param<T>) -> Result<Expression, Error>) -> Self {
        self.apply_with("Where", predicate)
    }

    #[must_use]
    pub fn order_by(self, key: impl FnOnce(&Param<T>) -> Result<Expression, Error>) -> Self {
        self.apply_with("OrderBy", key)
    }

    #[must_use]
    pub fn order_by_descending(
        self,
        key: impl FnOnce(&Param<T>) -> Result<Expression, Error>,
    ) -> Self {
        self.apply_with("OrderByDescending", key)
    }

    #[must_use]
    pub fn then_by(self, key: impl FnOnce(&Param<T>) -> Result<Expression, Error>) -> Self {
        self.apply_with("ThenBy", key)
    }

    #[must_use]
    pub fn then_by_descending(
        self,
        key: impl FnOnce(&Param<T>) -> Result<Expression, Error>,
    ) -> Self {
        self.apply_with("ThenByDescending", key)
    }

    #[must_use]
    pub fn select(self, projection: impl FnOnce(&Param<T>) -> Result<Expression, Error>) -> Self {
        self.apply_with("Select", projection)
    }

    /// Skip `count` more items. Successive skips add up.
    #[must_use]
    pub fn skip(mut self, count: u32) -> Self {
        self.paging.skip = Some(self.paging.skip.unwrap_or(0).saturating_add(count));
        self
    }

    /// Return at most `count` items. Successive takes can only narrow the limit.
    #[must_use]
    pub fn take(mut self, count: u32) -> Self {
        if count == 0 {
            return self.record(Error::InvalidArgument(
                "the number of items to take must be positive".to_string(),
            ));
        }
        self.paging.take = Some(self.paging.take.map_or(count, |take| take.min(count)));
        self
    }

    #[must_use]
    pub fn include_total_count(mut self) -> Self {
        self.include_total_count = true;
        self
    }

    #[must_use]
    pub fn include_deleted_items(mut self) -> Self {
        self.include_deleted_items = true;
        self
    }

    /// Add a custom query parameter. Keys starting with `$` or `__` are reserved.
    #[must_use]
    pub fn with_parameter(mut self, key: &str, value: &str) -> Self {
        if let Err(error) = validate_parameter_name(key) {
            return self.record(error.into());
        }
        self.parameters.retain(|(existing, _)| existing != key);
        self.parameters.push((key.to_string(), value.to_string()));
        self
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn paging(&self) -> Paging {
        self.paging
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    pub fn includes_total_count(&self) -> bool {
        self.include_total_count
    }

    pub fn includes_deleted_items(&self) -> bool {
        self.include_deleted_items
    }

    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }
}
