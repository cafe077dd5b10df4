//! Filter and ordering nodes.

use std::fmt;

use enum_iterator::Sequence;
use query_engine_metadata::metadata::{ClrType, Value};

use super::error::Error;

/// A property path, rooted at the entity being queried.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberAccess {
    /// The member this one is read from, or `None` for a member of the entity itself.
    pub instance: Option<Box<MemberAccess>>,
    pub name: String,
}

impl MemberAccess {
    pub fn new(name: impl Into<String>) -> Self {
        MemberAccess {
            instance: None,
            name: name.into(),
        }
    }

    /// Access `name` on the value of this member.
    #[must_use]
    pub fn then(self, name: impl Into<String>) -> Self {
        MemberAccess {
            instance: Some(Box::new(self)),
            name: name.into(),
        }
    }

    pub fn is_nested(&self) -> bool {
        self.instance.is_some()
    }

    /// The names along the path, outermost first.
    pub fn path(&self) -> Vec<&str> {
        let mut path = match &self.instance {
            Some(instance) => instance.path(),
            None => vec![],
        };
        path.push(&self.name);
        path
    }
}

impl fmt::Display for MemberAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().join("."))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence)]
pub enum UnaryOperatorKind {
    Not,
    Negate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence)]
pub enum BinaryOperatorKind {
    And,
    Or,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOperatorKind {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperatorKind::Eq
                | BinaryOperatorKind::Ne
                | BinaryOperatorKind::Gt
                | BinaryOperatorKind::Ge
                | BinaryOperatorKind::Lt
                | BinaryOperatorKind::Le
        )
    }
}

/// A node of a filter expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Constant(Value),
    MemberAccess(MemberAccess),
    UnaryOperator {
        kind: UnaryOperatorKind,
        operand: Box<FilterNode>,
    },
    BinaryOperator {
        kind: BinaryOperatorKind,
        left: Box<FilterNode>,
        right: Box<FilterNode>,
    },
    FunctionCall {
        name: String,
        arguments: Vec<FilterNode>,
    },
    /// An explicit conversion of `source` to `target`.
    Convert {
        source: Box<FilterNode>,
        target: ClrType,
    },
}

impl FilterNode {
    /// Build a binary operator node from a list of children, which must hold exactly two nodes.
    pub fn binary_from_children(
        kind: BinaryOperatorKind,
        children: Vec<FilterNode>,
    ) -> Result<FilterNode, Error> {
        let mut node = PendingNode::binary(kind);
        node.set_children(children)?;
        node.build()
    }

    pub fn unary_from_children(
        kind: UnaryOperatorKind,
        children: Vec<FilterNode>,
    ) -> Result<FilterNode, Error> {
        let mut node = PendingNode::unary(kind);
        node.set_children(children)?;
        node.build()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingKind {
    Unary(UnaryOperatorKind),
    Binary(BinaryOperatorKind),
    Convert(ClrType),
}

impl PendingKind {
    fn arity(&self) -> usize {
        match self {
            PendingKind::Binary(_) => 2,
            PendingKind::Unary(_) | PendingKind::Convert(_) => 1,
        }
    }

    fn name(&self) -> String {
        match self {
            PendingKind::Unary(kind) => format!("{kind:?}"),
            PendingKind::Binary(kind) => format!("{kind:?}"),
            PendingKind::Convert(target) => format!("Convert({target})"),
        }
    }

    fn arity_error(&self, actual: usize) -> Error {
        Error::Arity {
            operator: self.name(),
            expected: self.arity(),
            actual,
        }
    }
}

/// An operator node whose children have not been bound yet.
///
/// The number of children is checked when they are bound, and a node accepts
/// exactly one binding.
#[derive(Debug, Clone)]
pub struct PendingNode {
    kind: PendingKind,
    children: Option<Vec<FilterNode>>,
}

impl PendingNode {
    pub fn unary(kind: UnaryOperatorKind) -> Self {
        PendingNode {
            kind: PendingKind::Unary(kind),
            children: None,
        }
    }

    pub fn binary(kind: BinaryOperatorKind) -> Self {
        PendingNode {
            kind: PendingKind::Binary(kind),
            children: None,
        }
    }

    pub fn convert(target: ClrType) -> Self {
        PendingNode {
            kind: PendingKind::Convert(target),
            children: None,
        }
    }

    pub fn arity(&self) -> usize {
        self.kind.arity()
    }

    pub fn is_frozen(&self) -> bool {
        self.children.is_some()
    }

    /// Bind the children of this node. Fails if the count is wrong, or if
    /// children were already bound.
    pub fn set_children(&mut self, children: Vec<FilterNode>) -> Result<(), Error> {
        if self.is_frozen() {
            return Err(Error::FrozenNode(self.kind.name()));
        }
        if children.len() != self.arity() {
            return Err(self.kind.arity_error(children.len()));
        }
        self.children = Some(children);
        Ok(())
    }

    /// Finish the node. A node whose children were never bound has no valid form.
    pub fn build(self) -> Result<FilterNode, Error> {
        let PendingNode { kind, children } = self;
        let Some(children) = children else {
            return Err(kind.arity_error(0));
        };
        let actual = children.len();
        let mut children = children.into_iter();
        match (kind, children.next(), children.next(), children.next()) {
            (PendingKind::Binary(kind), Some(left), Some(right), None) => {
                Ok(FilterNode::BinaryOperator {
                    kind,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            (PendingKind::Unary(kind), Some(operand), None, None) => Ok(FilterNode::UnaryOperator {
                kind,
                operand: Box::new(operand),
            }),
            (PendingKind::Convert(target), Some(source), None, None) => Ok(FilterNode::Convert {
                source: Box::new(source),
                target,
            }),
            (kind, ..) => Err(kind.arity_error(actual)),
        }
    }
}

/// The direction of an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

/// A sort key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderByNode {
    pub member: MemberAccess,
    pub direction: OrderDirection,
}

impl OrderByNode {
    pub fn ascending(member: MemberAccess) -> Self {
        OrderByNode {
            member,
            direction: OrderDirection::Ascending,
        }
    }

    pub fn descending(member: MemberAccess) -> Self {
        OrderByNode {
            member,
            direction: OrderDirection::Descending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(i: i32) -> FilterNode {
        FilterNode::Constant(Value::Int32(i))
    }

    #[test]
    fn test_binary_operators_reject_wrong_child_counts() {
        for kind in enum_iterator::all::<BinaryOperatorKind>() {
            for count in [0, 1, 3] {
                let children = (0..count).map(leaf).collect();
                let result = FilterNode::binary_from_children(kind, children);
                assert_eq!(
                    result,
                    Err(Error::Arity {
                        operator: format!("{kind:?}"),
                        expected: 2,
                        actual: usize::try_from(count).unwrap(),
                    })
                );
            }
            assert!(FilterNode::binary_from_children(kind, vec![leaf(1), leaf(2)]).is_ok());
        }
    }

    #[test]
    fn test_unary_operators_reject_wrong_child_counts() {
        for kind in enum_iterator::all::<UnaryOperatorKind>() {
            assert!(FilterNode::unary_from_children(kind, vec![]).is_err());
            assert!(FilterNode::unary_from_children(kind, vec![leaf(1), leaf(2)]).is_err());
            assert!(FilterNode::unary_from_children(kind, vec![leaf(1)]).is_ok());
        }
    }

    #[test]
    fn children_can_only_be_bound_once() {
        let mut node = PendingNode::binary(BinaryOperatorKind::Eq);
        node.set_children(vec![leaf(1), leaf(2)]).unwrap();
        assert!(node.is_frozen());
        assert_eq!(
            node.set_children(vec![leaf(3), leaf(4)]),
            Err(Error::FrozenNode("Eq".to_string()))
        );
    }

    #[test]
    fn failed_binding_leaves_the_node_open() {
        let mut node = PendingNode::convert(ClrType::Int64);
        assert!(node.set_children(vec![]).is_err());
        assert!(!node.is_frozen());
        node.set_children(vec![leaf(1)]).unwrap();
        assert_eq!(
            node.build().unwrap(),
            FilterNode::Convert {
                source: Box::new(leaf(1)),
                target: ClrType::Int64,
            }
        );
    }

    #[test]
    fn unbound_nodes_cannot_be_built() {
        let result = PendingNode::unary(UnaryOperatorKind::Not).build();
        assert!(matches!(result, Err(Error::Arity { actual: 0, .. })));
    }

    #[test]
    fn member_paths_are_outermost_first() {
        let member = MemberAccess::new("director").then("address").then("city");
        assert_eq!(member.path(), vec!["director", "address", "city"]);
        assert!(member.is_nested());
        assert_eq!(member.to_string(), "director.address.city");
    }
}
