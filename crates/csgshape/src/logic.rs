//! Linearization of CSG nodes into flat logic token sequences.
//!
//! A token is either a face index (the position of a surface in the volume's
//! sorted face list) or one of the operator tokens at the top of the `u32`
//! range.

use std::fmt;

use itertools::Itertools;

use crate::surface::LocalSurfaceId;
use crate::tree::{CsgTree, JoinOp, Node, NodeId};

/// Integer type of a logic token.
pub type LogicInt = u32;

/// Open parenthesis (infix only).
pub const OPEN: LogicInt = LogicInt::MAX - 6;
/// Close parenthesis (infix only).
pub const CLOSE: LogicInt = LogicInt::MAX - 5;
/// Binary logical OR.
pub const OR: LogicInt = LogicInt::MAX - 4;
/// Binary logical AND.
pub const AND: LogicInt = LogicInt::MAX - 3;
/// Unary negation.
pub const NOT: LogicInt = LogicInt::MAX - 2;
/// Constant `true`.
pub const TRUE: LogicInt = LogicInt::MAX - 1;

/// Returns whether a token is an operator rather than a face index.
pub fn is_operator_token(token: LogicInt) -> bool {
    token >= OPEN
}

fn join_token(op: JoinOp) -> LogicInt {
    match op {
        JoinOp::And => AND,
        JoinOp::Or => OR,
    }
}

/// Order of operators relative to their operands.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LogicNotation {
    /// Reverse Polish notation: `0 1 ~ &`
    #[default]
    Postfix,
    /// Parenthesized infix notation: `( 0 & ~ 1 )`
    Infix,
}

/// Logic expression for a single node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltLogic {
    /// Sorted surfaces referenced by the expression
    pub faces: Vec<LocalSurfaceId>,
    /// Tokens, with surfaces replaced by their index in `faces`
    pub logic: Vec<LogicInt>,
}

impl fmt::Display for BuiltLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (faces: {})", logic_to_string(&self.logic), self.faces.iter().join(", "))
    }
}

/// Builds the logic expression for a node.
///
/// Every node reachable from `node` must be a constant, surface, negation,
/// or join; aliases are followed.
pub fn build_logic(tree: &CsgTree, node: NodeId, notation: LogicNotation) -> BuiltLogic {
    build_logic_impl(tree, node, notation, None)
}

/// Builds the logic expression for a node after replacing each surface ID
/// with its position in `mapping`.
///
/// `mapping` must be sorted and contain every surface reachable from `node`,
/// for example the output of [`crate::tree::calc_surfaces()`].
pub fn build_logic_with_mapping(
    tree: &CsgTree,
    node: NodeId,
    notation: LogicNotation,
    mapping: &[LocalSurfaceId],
) -> BuiltLogic {
    build_logic_impl(tree, node, notation, Some(mapping))
}

fn build_logic_impl(
    tree: &CsgTree,
    node: NodeId,
    notation: LogicNotation,
    mapping: Option<&[LocalSurfaceId]>,
) -> BuiltLogic {
    let writer = LogicWriter::new(tree, mapping);
    let mut logic = match notation {
        LogicNotation::Postfix => PostfixLogicBuilder(writer).build(node),
        LogicNotation::Infix => InfixLogicBuilder(writer).build(node),
    };
    let faces = remap_faces(&mut logic);
    BuiltLogic { faces, logic }
}

/// Replaces surface IDs in `logic` with their index in the returned sorted
/// list of unique surfaces.
fn remap_faces(logic: &mut [LogicInt]) -> Vec<LocalSurfaceId> {
    let faces = logic
        .iter()
        .filter(|&&t| !is_operator_token(t))
        .map(|&t| LocalSurfaceId(t))
        .sorted_unstable()
        .dedup()
        .collect_vec();
    for t in logic.iter_mut().filter(|t| !is_operator_token(**t)) {
        // Every token was just collected into `faces`
        if let Ok(i) = faces.binary_search(&LocalSurfaceId(*t)) {
            *t = i as LogicInt;
        }
    }
    faces
}

/// Token output shared by the builders.
#[derive(Debug)]
struct LogicWriter<'a> {
    tree: &'a CsgTree,
    mapping: Option<&'a [LocalSurfaceId]>,
    logic: Vec<LogicInt>,
}

impl<'a> LogicWriter<'a> {
    fn new(tree: &'a CsgTree, mapping: Option<&'a [LocalSurfaceId]>) -> Self {
        Self {
            tree,
            mapping,
            logic: vec![],
        }
    }

    fn push(&mut self, token: LogicInt) {
        self.logic.push(token);
    }

    fn push_surface(&mut self, s: LocalSurfaceId) {
        let index = match self.mapping {
            None => s.0,
            Some(mapping) => match mapping.binary_search(&s) {
                Ok(i) => i as LogicInt,
                Err(_) => panic!("surface {s} is missing from the mapping"),
            },
        };
        assert!(!is_operator_token(index), "surface index {index} is too large");
        self.push(index);
    }
}

/// Depth-first walk of a node that emits tokens.
trait LogicBuilder<'a>: Sized {
    fn writer(&mut self) -> &mut LogicWriter<'a>;
    fn into_writer(self) -> LogicWriter<'a>;

    fn visit_negated(&mut self, target: NodeId);
    fn visit_joined(&mut self, op: JoinOp, children: &[NodeId]);

    fn visit(&mut self, id: NodeId) {
        let tree = self.writer().tree;
        match &tree[id] {
            Node::True => self.writer().push(TRUE),
            Node::False => unreachable!("false is always stored as not{{true}}"),
            // Not present in a fully simplified tree
            Node::Aliased(target) => self.visit(*target),
            Node::Surface(s) => self.writer().push_surface(*s),
            Node::Negated(target) => self.visit_negated(*target),
            Node::Joined(op, children) => {
                debug_assert!(children.len() > 1, "join of {children:?} was not simplified");
                self.visit_joined(*op, children);
            }
        }
    }

    fn build(mut self, id: NodeId) -> Vec<LogicInt> {
        self.visit(id);
        self.into_writer().logic
    }
}

/// Emits logic in postfix notation.
///
/// `all(+1, +3, !all(+2, +4))` becomes `1 3 & 2 4 & ~ &`.
#[derive(Debug)]
struct PostfixLogicBuilder<'a>(LogicWriter<'a>);

impl<'a> LogicBuilder<'a> for PostfixLogicBuilder<'a> {
    fn writer(&mut self) -> &mut LogicWriter<'a> {
        &mut self.0
    }
    fn into_writer(self) -> LogicWriter<'a> {
        self.0
    }

    fn visit_negated(&mut self, target: NodeId) {
        self.visit(target);
        self.0.push(NOT);
    }

    fn visit_joined(&mut self, op: JoinOp, children: &[NodeId]) {
        let (first, rest) = children.split_first().expect("join must have children");
        self.visit(*first);
        for &child in rest {
            self.visit(child);
            self.0.push(join_token(op));
        }
    }
}

/// Emits logic in infix notation, with every join in parentheses.
///
/// `all(+1, +3, any(-2, -4))` becomes `( 1 & 3 & ( ~ 2 | ~ 4 ) )`.
#[derive(Debug)]
struct InfixLogicBuilder<'a>(LogicWriter<'a>);

impl<'a> LogicBuilder<'a> for InfixLogicBuilder<'a> {
    fn writer(&mut self) -> &mut LogicWriter<'a> {
        &mut self.0
    }
    fn into_writer(self) -> LogicWriter<'a> {
        self.0
    }

    fn visit_negated(&mut self, target: NodeId) {
        self.0.push(NOT);
        self.visit(target);
    }

    fn visit_joined(&mut self, op: JoinOp, children: &[NodeId]) {
        self.0.push(OPEN);
        for (i, &child) in children.iter().enumerate() {
            if i > 0 {
                self.0.push(join_token(op));
            }
            self.visit(child);
        }
        self.0.push(CLOSE);
    }
}

/// Renders a token sequence for debugging, such as `0 1 ~ & 2 |`.
pub fn logic_to_string(logic: &[LogicInt]) -> String {
    logic
        .iter()
        .map(|&t| match t {
            OPEN => "(".to_string(),
            CLOSE => ")".to_string(),
            OR => "|".to_string(),
            AND => "&".to_string(),
            NOT => "~".to_string(),
            TRUE => "*".to_string(),
            _ if is_operator_token(t) => "?".to_string(),
            _ => t.to_string(),
        })
        .join(" ")
}

/// Evaluates a token sequence given the value of each face.
///
/// Returns `None` if the sequence is malformed.
pub fn eval_logic(
    logic: &[LogicInt],
    notation: LogicNotation,
    face_value: impl Fn(usize) -> bool,
) -> Option<bool> {
    match notation {
        LogicNotation::Postfix => eval_postfix(logic, &face_value),
        LogicNotation::Infix => {
            let mut parser = InfixEvaluator {
                tokens: logic,
                pos: 0,
                face_value: &face_value,
            };
            let result = parser.parse_or()?;
            (parser.pos == logic.len()).then_some(result)
        }
    }
}

fn eval_postfix(logic: &[LogicInt], face_value: &dyn Fn(usize) -> bool) -> Option<bool> {
    let mut stack = vec![];
    for &t in logic {
        match t {
            TRUE => stack.push(true),
            NOT => {
                let a = stack.pop()?;
                stack.push(!a);
            }
            AND | OR => {
                let b = stack.pop()?;
                let a = stack.pop()?;
                stack.push(if t == AND { a && b } else { a || b });
            }
            _ if is_operator_token(t) => return None,
            _ => stack.push(face_value(t as usize)),
        }
    }
    match stack.as_slice() {
        &[result] => Some(result),
        _ => None,
    }
}

/// Recursive-descent evaluator for infix logic, with NOT binding tightest
/// and AND binding tighter than OR.
struct InfixEvaluator<'a> {
    tokens: &'a [LogicInt],
    pos: usize,
    face_value: &'a dyn Fn(usize) -> bool,
}

impl InfixEvaluator<'_> {
    fn peek(&self) -> Option<LogicInt> {
        self.tokens.get(self.pos).copied()
    }
    fn advance(&mut self) -> Option<LogicInt> {
        let t = self.peek()?;
        self.pos += 1;
        Some(t)
    }

    fn parse_or(&mut self) -> Option<bool> {
        let mut result = self.parse_and()?;
        while self.peek() == Some(OR) {
            self.pos += 1;
            result |= self.parse_and()?;
        }
        Some(result)
    }

    fn parse_and(&mut self) -> Option<bool> {
        let mut result = self.parse_unary()?;
        while self.peek() == Some(AND) {
            self.pos += 1;
            result &= self.parse_unary()?;
        }
        Some(result)
    }

    fn parse_unary(&mut self) -> Option<bool> {
        match self.advance()? {
            NOT => Some(!self.parse_unary()?),
            TRUE => Some(true),
            OPEN => {
                let result = self.parse_or()?;
                (self.advance()? == CLOSE).then_some(result)
            }
            t if is_operator_token(t) => None,
            t => Some((self.face_value)(t as usize)),
        }
    }
}

/// Determines whether nodes need internal-surface tracking at runtime.
///
/// A node that is a constant, a sensed surface, or an intersection of sensed
/// surfaces is "simple": a point leaving it must cross one of its faces. Any
/// union or negated join can have faces that lie inside the region.
#[derive(Debug)]
pub struct InternalSurfaceFlagger<'a> {
    tree: &'a CsgTree,
    cache: Vec<Option<bool>>,
}

impl<'a> InternalSurfaceFlagger<'a> {
    /// Constructs a flagger for a tree.
    pub fn new(tree: &'a CsgTree) -> Self {
        Self {
            tree,
            cache: vec![None; tree.len()],
        }
    }

    /// Returns whether a node has faces that may be internal to it.
    pub fn has_internal_surfaces(&mut self, id: NodeId) -> bool {
        if let Some(cached) = self.cache[id.0 as usize] {
            return cached;
        }
        let tree = self.tree;
        let result = match &tree[id] {
            Node::True | Node::False | Node::Surface(_) => false,
            Node::Aliased(target) => self.has_internal_surfaces(*target),
            Node::Negated(target) => !matches!(
                tree[tree.resolve_alias(*target)],
                Node::True | Node::Surface(_)
            ),
            Node::Joined(JoinOp::And, children) => {
                children.iter().any(|&c| self.has_internal_surfaces(c))
            }
            Node::Joined(JoinOp::Or, _) => true,
        };
        self.cache[id.0 as usize] = Some(result);
        result
    }
}
