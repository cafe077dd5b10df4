//! The in-memory query expression: the shape of a query before it is compiled.
//!
//! A query is a chain of method calls rooted at a table source. Predicates,
//! sort keys and projections are lambdas over a single entity parameter.

use query_engine_metadata::metadata::{
    common_type, schema_of, ClrType, Entity, EntitySchema, MemberInfo, Value,
};

use super::query::error::Error;

/// The node kinds of a binary expression, including those no target can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceBinaryKind {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    And,
    AndAlso,
    Or,
    OrElse,
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Coalesce,
    ExclusiveOr,
    Power,
    LeftShift,
    RightShift,
}

impl SourceBinaryKind {
    fn is_boolean(self) -> bool {
        matches!(
            self,
            SourceBinaryKind::AndAlso
                | SourceBinaryKind::OrElse
                | SourceBinaryKind::Equal
                | SourceBinaryKind::NotEqual
                | SourceBinaryKind::GreaterThan
                | SourceBinaryKind::GreaterThanOrEqual
                | SourceBinaryKind::LessThan
                | SourceBinaryKind::LessThanOrEqual
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceUnaryKind {
    Not,
    Negate,
    Convert(ClrType),
    /// Wraps a lambda passed to a query operator.
    Quote,
}

/// The type a method is declared on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeclaringType {
    /// The query operators: `Where`, `OrderBy`, ...
    Queryable,
    String,
    Math,
    Object,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub declaring: DeclaringType,
    pub name: String,
    pub return_type: ClrType,
}

impl MethodRef {
    pub fn new(declaring: DeclaringType, name: impl Into<String>, return_type: ClrType) -> Self {
        MethodRef {
            declaring,
            name: name.into(),
            return_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterExpression {
    pub name: String,
    pub ty: ClrType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpression {
    pub parameters: Vec<ParameterExpression>,
    pub body: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// The table a query chain starts from.
    Source { table_name: String, entity: ClrType },
    Parameter(ParameterExpression),
    Constant(Value),
    /// A local variable captured by a lambda.
    Captured { name: String, value: Value },
    Member {
        expression: Box<Expression>,
        member: MemberInfo,
    },
    Binary {
        kind: SourceBinaryKind,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Unary {
        kind: SourceUnaryKind,
        operand: Box<Expression>,
    },
    Call {
        method: MethodRef,
        /// The instance for instance methods, `None` for static ones.
        object: Option<Box<Expression>>,
        arguments: Vec<Expression>,
    },
    Lambda(LambdaExpression),
    /// An anonymous object built from named values, as produced by a projection.
    New { members: Vec<(String, Expression)> },
}

#[allow(clippy::should_implement_trait)]
impl Expression {
    pub fn source<T: Entity>() -> Expression {
        Expression::Source {
            table_name: T::TABLE_NAME.to_string(),
            entity: schema_of::<T>().clr_type(),
        }
    }

    pub fn parameter(name: impl Into<String>, ty: ClrType) -> Expression {
        Expression::Parameter(ParameterExpression {
            name: name.into(),
            ty,
        })
    }

    pub fn constant(value: impl Into<Value>) -> Expression {
        Expression::Constant(value.into())
    }

    pub fn captured(name: impl Into<String>, value: impl Into<Value>) -> Expression {
        Expression::Captured {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn lambda(parameters: Vec<ParameterExpression>, body: Expression) -> Expression {
        Expression::Lambda(LambdaExpression {
            parameters,
            body: Box::new(body),
        })
    }

    /// Read `member` from the value of this expression.
    #[must_use]
    pub fn member(self, member: MemberInfo) -> Expression {
        Expression::Member {
            expression: Box::new(self),
            member,
        }
    }

    /// Read the member called `name` declared by the entity `E`.
    pub fn get<E: Entity>(self, name: &str) -> Result<Expression, Error> {
        self.field(&schema_of::<E>(), name)
    }

    pub fn field(self, schema: &EntitySchema, name: &str) -> Result<Expression, Error> {
        let member = schema.member(name).cloned().ok_or_else(|| {
            Error::InvalidPredicate(format!("'{name}' is not a member of '{}'", schema.name))
        })?;
        Ok(self.member(member))
    }

    /// The type of the value this expression produces.
    pub fn ty(&self) -> ClrType {
        match self {
            Expression::Source { entity, .. } => entity.clone(),
            Expression::Parameter(parameter) => parameter.ty.clone(),
            Expression::Constant(value) | Expression::Captured { value, .. } => value.clr_type(),
            Expression::Member { member, .. } => member.ty.clone(),
            Expression::Binary { kind, left, right } => {
                if kind.is_boolean() {
                    ClrType::Bool
                } else {
                    let (left, right) = (left.ty(), right.ty());
                    common_type(&left, &right).unwrap_or(left)
                }
            }
            Expression::Unary { kind, operand } => match kind {
                SourceUnaryKind::Convert(target) => target.clone(),
                SourceUnaryKind::Not | SourceUnaryKind::Negate | SourceUnaryKind::Quote => {
                    operand.ty()
                }
            },
            Expression::Call { method, .. } => method.return_type.clone(),
            Expression::Lambda(lambda) => lambda.body.ty(),
            Expression::New { .. } => ClrType::Entity("<anonymous>".to_string()),
        }
    }

    /// The direct subexpressions, in evaluation order.
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Source { .. }
            | Expression::Parameter(_)
            | Expression::Constant(_)
            | Expression::Captured { .. } => vec![],
            Expression::Member { expression, .. } => vec![expression.as_ref()],
            Expression::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Expression::Unary { operand, .. } => vec![operand.as_ref()],
            Expression::Call {
                object, arguments, ..
            } => object.iter().map(AsRef::as_ref).chain(arguments).collect(),
            Expression::Lambda(lambda) => vec![lambda.body.as_ref()],
            Expression::New { members } => members.iter().map(|(_, value)| value).collect(),
        }
    }

    fn binary(self, kind: SourceBinaryKind, right: impl Into<Expression>) -> Expression {
        Expression::Binary {
            kind,
            left: Box::new(self),
            right: Box::new(right.into()),
        }
    }

    fn unary(self, kind: SourceUnaryKind) -> Expression {
        Expression::Unary {
            kind,
            operand: Box::new(self),
        }
    }

    #[must_use]
    pub fn eq(self, right: impl Into<Expression>) -> Expression {
        self.binary(SourceBinaryKind::Equal, right)
    }

    #[must_use]
    pub fn ne(self, right: impl Into<Expression>) -> Expression {
        self.binary(SourceBinaryKind::NotEqual, right)
    }

    #[must_use]
    pub fn gt(self, right: impl Into<Expression>) -> Expression {
        self.binary(SourceBinaryKind::GreaterThan, right)
    }

    #[must_use]
    pub fn ge(self, right: impl Into<Expression>) -> Expression {
        self.binary(SourceBinaryKind::GreaterThanOrEqual, right)
    }

    #[must_use]
    pub fn lt(self, right: impl Into<Expression>) -> Expression {
        self.binary(SourceBinaryKind::LessThan, right)
    }

    #[must_use]
    pub fn le(self, right: impl Into<Expression>) -> Expression {
        self.binary(SourceBinaryKind::LessThanOrEqual, right)
    }

    #[must_use]
    pub fn and_also(self, right: impl Into<Expression>) -> Expression {
        self.binary(SourceBinaryKind::AndAlso, right)
    }

    #[must_use]
    pub fn or_else(self, right: impl Into<Expression>) -> Expression {
        self.binary(SourceBinaryKind::OrElse, right)
    }

    #[must_use]
    pub fn add(self, right: impl Into<Expression>) -> Expression {
        self.binary(SourceBinaryKind::Add, right)
    }

    #[must_use]
    pub fn sub(self, right: impl Into<Expression>) -> Expression {
        self.binary(SourceBinaryKind::Subtract, right)
    }

    #[must_use]
    pub fn mul(self, right: impl Into<Expression>) -> Expression {
        self.binary(SourceBinaryKind::Multiply, right)
    }

    #[must_use]
    pub fn div(self, right: impl Into<Expression>) -> Expression {
        self.binary(SourceBinaryKind::Divide, right)
    }

    #[must_use]
    pub fn rem(self, right: impl Into<Expression>) -> Expression {
        self.binary(SourceBinaryKind::Modulo, right)
    }

    #[must_use]
    pub fn with(self, kind: SourceBinaryKind, right: impl Into<Expression>) -> Expression {
        self.binary(kind, right)
    }

    #[must_use]
    pub fn not(self) -> Expression {
        self.unary(SourceUnaryKind::Not)
    }

    #[must_use]
    pub fn negate(self) -> Expression {
        self.unary(SourceUnaryKind::Negate)
    }

    #[must_use]
    pub fn convert(self, target: ClrType) -> Expression {
        self.unary(SourceUnaryKind::Convert(target))
    }

    #[must_use]
    pub fn quote(self) -> Expression {
        self.unary(SourceUnaryKind::Quote)
    }

    /// Call an instance method on the value of this expression.
    #[must_use]
    pub fn call(self, method: MethodRef, arguments: Vec<Expression>) -> Expression {
        Expression::Call {
            method,
            object: Some(Box::new(self)),
            arguments,
        }
    }

    pub fn call_static(method: MethodRef, arguments: Vec<Expression>) -> Expression {
        Expression::Call {
            method,
            object: None,
            arguments,
        }
    }

    fn string_method(self, name: &str, return_type: ClrType, arguments: Vec<Expression>) -> Self {
        self.call(
            MethodRef::new(DeclaringType::String, name, return_type),
            arguments,
        )
    }

    #[must_use]
    pub fn to_lower(self) -> Expression {
        self.string_method("ToLower", ClrType::String, vec![])
    }

    #[must_use]
    pub fn to_upper(self) -> Expression {
        self.string_method("ToUpper", ClrType::String, vec![])
    }

    #[must_use]
    pub fn trim(self) -> Expression {
        self.string_method("Trim", ClrType::String, vec![])
    }

    #[must_use]
    pub fn starts_with(self, prefix: impl Into<Expression>) -> Expression {
        self.string_method("StartsWith", ClrType::Bool, vec![prefix.into()])
    }

    #[must_use]
    pub fn ends_with(self, suffix: impl Into<Expression>) -> Expression {
        self.string_method("EndsWith", ClrType::Bool, vec![suffix.into()])
    }

    #[must_use]
    pub fn contains(self, value: impl Into<Expression>) -> Expression {
        self.string_method("Contains", ClrType::Bool, vec![value.into()])
    }

    #[must_use]
    pub fn index_of(self, value: impl Into<Expression>) -> Expression {
        self.string_method("IndexOf", ClrType::Int32, vec![value.into()])
    }

    #[must_use]
    pub fn replace(self, from: impl Into<Expression>, to: impl Into<Expression>) -> Expression {
        self.string_method("Replace", ClrType::String, vec![from.into(), to.into()])
    }

    #[must_use]
    pub fn substring(self, start: impl Into<Expression>, length: Option<Expression>) -> Expression {
        let mut arguments = vec![start.into()];
        arguments.extend(length);
        self.string_method("Substring", ClrType::String, arguments)
    }

    /// The `Length` property of a string.
    #[must_use]
    pub fn length(self) -> Expression {
        self.member(MemberInfo::new("Length", ClrType::Int32))
    }

    /// A date component property (`Day`, `Month`, `Year`, `Hour`, `Minute` or `Second`).
    #[must_use]
    pub fn date_part(self, part: &str) -> Expression {
        self.member(MemberInfo::new(part, ClrType::Int32))
    }

    pub fn concat(left: impl Into<Expression>, right: impl Into<Expression>) -> Expression {
        Expression::call_static(
            MethodRef::new(DeclaringType::String, "Concat", ClrType::String),
            vec![left.into(), right.into()],
        )
    }

    pub fn math(name: &str, argument: impl Into<Expression>) -> Expression {
        let argument = argument.into();
        let return_type = argument.ty();
        Expression::call_static(
            MethodRef::new(DeclaringType::Math, name, return_type),
            vec![argument],
        )
    }
}

macro_rules! impl_from_for_expression {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Expression {
                fn from(value: $ty) -> Self {
                    Expression::Constant(value.into())
                }
            }
        )*
    };
}

impl_from_for_expression! {
    Value,
    bool,
    u8,
    i8,
    char,
    i16,
    u16,
    i32,
    u32,
    i64,
    u64,
    f32,
    f64,
    rust_decimal::Decimal,
    String,
    &str,
    chrono::DateTime<chrono::Utc>,
}
