// Syntax tree definitions for the C front end

use rustc_hash::FxHashMap;
use std::fmt;
use std::ops::Range;

/// Index of a node inside its [`SyntaxTree`] arena
pub type NodeId = usize;

/// Children reserved the first time a node gains a child; later growth doubles.
pub const INITIAL_CHILD_CAPACITY: usize = 4;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Half-open byte range `[start, end)` into the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(end >= start, "span end {end} before start {start}");
        Self { start, end }
    }

    pub fn len(self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn contains(self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn as_range(self) -> Range<usize> {
        self.start..self.end
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    BitShl,
    BitShr,
    // Assignment
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    ShlAssign,
    ShrAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    // Access
    Subscript,     // a[i]
    Member,        // a.b
    PointerMember, // a->b
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::BitShl => "<<",
            BinOp::BitShr => ">>",
            BinOp::Assign => "=",
            BinOp::AddAssign => "+=",
            BinOp::SubAssign => "-=",
            BinOp::MulAssign => "*=",
            BinOp::DivAssign => "/=",
            BinOp::ModAssign => "%=",
            BinOp::ShlAssign => "<<=",
            BinOp::ShrAssign => ">>=",
            BinOp::AndAssign => "&=",
            BinOp::OrAssign => "|=",
            BinOp::XorAssign => "^=",
            BinOp::Subscript => "[]",
            BinOp::Member => ".",
            BinOp::PointerMember => "->",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOp {
    Neg,     // -x
    Plus,    // +x
    Not,     // !x
    BitNot,  // ~x
    PreInc,  // ++x
    PreDec,  // --x
    PostInc, // x++
    PostDec, // x--
    Deref,   // *x
    AddrOf,  // &x
    Sizeof,  // sizeof x, sizeof(type)
}

impl UnOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Plus => "+",
            UnOp::Not => "!",
            UnOp::BitNot => "~",
            UnOp::PreInc | UnOp::PostInc => "++",
            UnOp::PreDec | UnOp::PostDec => "--",
            UnOp::Deref => "*",
            UnOp::AddrOf => "&",
            UnOp::Sizeof => "sizeof",
        }
    }
}

/// Literal flavours, mirroring the literal token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Int,
    Float,
    Hex,
    String,
    Char,
}

/// Include flavour: `<header>` or `"header"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncludeKind {
    System,
    Local,
}

/// Preprocessor directive names recognised after `#`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Include,
    Define,
    Undef,
    Ifdef,
    Ifndef,
    If,
    Elif,
    Else,
    Endif,
    Error,
    Warning,
    Line,
    Pragma,
    /// A stray `#` or an unrecognised directive word
    Unknown,
}

impl DirectiveKind {
    pub fn from_name(name: &[u8]) -> Self {
        match name {
            b"include" => DirectiveKind::Include,
            b"define" => DirectiveKind::Define,
            b"undef" => DirectiveKind::Undef,
            b"ifdef" => DirectiveKind::Ifdef,
            b"ifndef" => DirectiveKind::Ifndef,
            b"if" => DirectiveKind::If,
            b"elif" => DirectiveKind::Elif,
            b"else" => DirectiveKind::Else,
            b"endif" => DirectiveKind::Endif,
            b"error" => DirectiveKind::Error,
            b"warning" => DirectiveKind::Warning,
            b"line" => DirectiveKind::Line,
            b"pragma" => DirectiveKind::Pragma,
            _ => DirectiveKind::Unknown,
        }
    }
}

/// Every kind of node the tree can hold.
///
/// Operator and literal payloads live inside their variant, so a payload can
/// only be read under the kind it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,

    // Top-level constructs
    EmptyDeclaration,
    Declaration,
    DataType,
    Identifier,
    Initializer,
    Typedef,
    FunctionDeclaration,
    FunctionDefinition,
    ParameterList,
    Block,
    Directive(DirectiveKind),
    Include(IncludeKind),

    // Expressions
    BinaryOp(BinOp),
    UnaryOp(UnOp),
    Literal(LiteralKind),
    Call,
    Cast,
    Conditional,

    // Trivia
    Space,
    Tab,
    Newline,
    LineComment,
    BlockComment,

    /// A token no rule could place; kept so the source stays fully covered
    Unknown,
}

impl NodeKind {
    pub fn is_trivia(self) -> bool {
        self.is_whitespace() || self.is_comment()
    }

    pub fn is_whitespace(self) -> bool {
        matches!(self, NodeKind::Space | NodeKind::Tab | NodeKind::Newline)
    }

    pub fn is_comment(self) -> bool {
        matches!(self, NodeKind::LineComment | NodeKind::BlockComment)
    }

    pub fn is_expression(self) -> bool {
        matches!(
            self,
            NodeKind::BinaryOp(_)
                | NodeKind::UnaryOp(_)
                | NodeKind::Literal(_)
                | NodeKind::Identifier
                | NodeKind::Call
                | NodeKind::Cast
                | NodeKind::Conditional
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Program => write!(f, "Program"),
            NodeKind::EmptyDeclaration => write!(f, "EmptyDeclaration"),
            NodeKind::Declaration => write!(f, "Declaration"),
            NodeKind::DataType => write!(f, "DataType"),
            NodeKind::Identifier => write!(f, "Identifier"),
            NodeKind::Initializer => write!(f, "Initializer"),
            NodeKind::Typedef => write!(f, "Typedef"),
            NodeKind::FunctionDeclaration => write!(f, "FunctionDeclaration"),
            NodeKind::FunctionDefinition => write!(f, "FunctionDefinition"),
            NodeKind::ParameterList => write!(f, "ParameterList"),
            NodeKind::Block => write!(f, "Block"),
            NodeKind::Directive(kind) => write!(f, "Directive({kind:?})"),
            NodeKind::Include(kind) => write!(f, "Include({kind:?})"),
            NodeKind::BinaryOp(op) => write!(f, "BinaryOp({})", op.symbol()),
            NodeKind::UnaryOp(op) => write!(f, "UnaryOp({})", op.symbol()),
            NodeKind::Literal(kind) => write!(f, "Literal({kind:?})"),
            NodeKind::Call => write!(f, "Call"),
            NodeKind::Cast => write!(f, "Cast"),
            NodeKind::Conditional => write!(f, "Conditional"),
            NodeKind::Space => write!(f, "Space"),
            NodeKind::Tab => write!(f, "Tab"),
            NodeKind::Newline => write!(f, "Newline"),
            NodeKind::LineComment => write!(f, "LineComment"),
            NodeKind::BlockComment => write!(f, "BlockComment"),
            NodeKind::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A node stored in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    pub kind: NodeKind,
    pub span: Span,
    pub location: SourceLocation,
    children: Vec<NodeId>,
}

impl AstNode {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A detached node built during speculative parsing.
///
/// Nothing reaches the arena until the construct is accepted, so a rewind
/// leaves no orphans behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtree {
    pub kind: NodeKind,
    pub span: Span,
    pub location: SourceLocation,
    pub children: Vec<Subtree>,
}

impl Subtree {
    pub fn leaf(kind: NodeKind, span: Span, location: SourceLocation) -> Self {
        Self {
            kind,
            span,
            location,
            children: Vec::new(),
        }
    }

    /// Build a node whose children are put into document order.
    pub fn with_children(
        kind: NodeKind,
        span: Span,
        location: SourceLocation,
        mut children: Vec<Subtree>,
    ) -> Self {
        children.sort_by_key(|child| child.span.start);
        Self {
            kind,
            span,
            location,
            children,
        }
    }
}

/// Arena holding every node of one file's tree.
///
/// Nodes are only ever appended, never removed or moved, and the whole arena
/// is released together with the source it borrows from. Node 0 is always the
/// program root.
#[derive(Debug, Clone)]
pub struct SyntaxTree<'src> {
    source: &'src [u8],
    nodes: Vec<AstNode>,
}

impl<'src> SyntaxTree<'src> {
    pub fn new(source: &'src [u8]) -> Self {
        Self::starting_at(source, 0, SourceLocation::new(1, 1))
    }

    /// Tree whose root covers `source[start..]`, beginning at `location`.
    pub fn starting_at(source: &'src [u8], start: usize, location: SourceLocation) -> Self {
        let root = AstNode {
            kind: NodeKind::Program,
            span: Span::new(start.min(source.len()), source.len()),
            location,
            children: Vec::new(),
        };
        Self {
            source,
            nodes: vec![root],
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn source(&self) -> &'src [u8] {
        self.source
    }

    /// Total number of nodes, the root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the root has no children.
    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &AstNode {
        &self.nodes[id]
    }

    pub fn get(&self, id: NodeId) -> Option<&AstNode> {
        self.nodes.get(id)
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id].span
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Exact source bytes covered by a node.
    pub fn text(&self, id: NodeId) -> &'src [u8] {
        &self.source[self.nodes[id].span.as_range()]
    }

    /// Append a new leaf as the last child of `parent`.
    pub fn push(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        span: Span,
        location: SourceLocation,
    ) -> NodeId {
        debug_assert!(span.end <= self.source.len());
        let id = self.nodes.len();
        self.nodes.push(AstNode {
            kind,
            span,
            location,
            children: Vec::new(),
        });

        let children = &mut self.nodes[parent].children;
        if children.capacity() == 0 {
            children.reserve_exact(INITIAL_CHILD_CAPACITY);
        }
        children.push(id);
        id
    }

    /// Move a detached subtree into the arena under `parent`.
    ///
    /// Ids are handed out in pre-order; the walk uses an explicit stack so
    /// the depth of `subtree` is not bounded by the call stack.
    pub fn attach(&mut self, parent: NodeId, subtree: Subtree) -> NodeId {
        let id = self.push(parent, subtree.kind, subtree.span, subtree.location);
        let mut pending = vec![(id, subtree.children.into_iter())];

        while let Some((parent, children)) = pending.last_mut() {
            let parent = *parent;
            match children.next() {
                Some(child) => {
                    let id = self.push(parent, child.kind, child.span, child.location);
                    pending.push((id, child.children.into_iter()));
                }
                None => {
                    pending.pop();
                }
            }
        }
        id
    }

    /// Pre-order traversal yielding `(node, depth)`; the root has depth 0.
    pub fn walk(&self) -> Walk<'_, 'src> {
        Walk {
            tree: self,
            stack: vec![(self.root(), 0)],
        }
    }

    /// Concatenate the spans of the root's children.
    ///
    /// For any input this equals the source bytes the root covers, which is
    /// the whole buffer unless the tree was built with [`starting_at`](Self::starting_at).
    pub fn reconstruct(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.source.len());
        for &child in self.children(self.root()) {
            out.extend_from_slice(self.text(child));
        }
        out
    }

    /// Number of nodes of each kind, the root excluded.
    pub fn kind_counts(&self) -> FxHashMap<NodeKind, usize> {
        let mut counts = FxHashMap::default();
        for node in self.nodes.iter().skip(1) {
            *counts.entry(node.kind).or_insert(0) += 1;
        }
        counts
    }
}

/// Iterator returned by [`SyntaxTree::walk`]
pub struct Walk<'t, 'src> {
    tree: &'t SyntaxTree<'src>,
    stack: Vec<(NodeId, usize)>,
}

impl Iterator for Walk<'_, '_> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        for &child in self.tree.children(id).iter().rev() {
            self.stack.push((child, depth + 1));
        }
        Some((id, depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new(1, 1)
    }

    #[test]
    fn test_new_tree_has_program_root() {
        let tree = SyntaxTree::new(b"int x;");
        assert_eq!(tree.kind(tree.root()), NodeKind::Program);
        assert_eq!(tree.span(tree.root()), Span::new(0, 6));
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_first_child_reserves_initial_capacity() {
        let mut tree = SyntaxTree::new(b"abcdef");
        let root = tree.root();
        assert_eq!(tree.node(root).children.capacity(), 0);

        tree.push(root, NodeKind::Unknown, Span::new(0, 1), loc());
        assert_eq!(tree.node(root).children.capacity(), INITIAL_CHILD_CAPACITY);

        for i in 1..6 {
            tree.push(root, NodeKind::Unknown, Span::new(i, i + 1), loc());
        }
        assert_eq!(tree.children(root).len(), 6);
        assert!(tree.node(root).children.capacity() >= 6);
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let mut tree = SyntaxTree::new(b"a b");
        let root = tree.root();
        let a = tree.push(root, NodeKind::Identifier, Span::new(0, 1), loc());
        let space = tree.push(root, NodeKind::Space, Span::new(1, 2), loc());
        let b = tree.push(root, NodeKind::Identifier, Span::new(2, 3), loc());
        assert_eq!(tree.children(root), &[a, space, b]);
        assert_eq!(tree.text(b), b"b");
        assert_eq!(tree.reconstruct(), b"a b".to_vec());
    }

    #[test]
    fn test_attach_sorts_and_walks_in_preorder() {
        let source = b"int x;";
        let mut tree = SyntaxTree::new(source);
        let decl = Subtree::with_children(
            NodeKind::Declaration,
            Span::new(0, 6),
            loc(),
            vec![
                Subtree::leaf(NodeKind::Identifier, Span::new(4, 5), loc()),
                Subtree::leaf(NodeKind::DataType, Span::new(0, 3), loc()),
            ],
        );
        let id = tree.attach(tree.root(), decl);

        let kinds: Vec<(NodeKind, usize)> =
            tree.walk().map(|(node, depth)| (tree.kind(node), depth)).collect();
        assert_eq!(
            kinds,
            vec![
                (NodeKind::Program, 0),
                (NodeKind::Declaration, 1),
                (NodeKind::DataType, 2),
                (NodeKind::Identifier, 2),
            ]
        );
        assert_eq!(tree.text(id), b"int x;");
    }

    #[test]
    fn test_attach_deep_chain() {
        const DEPTH: usize = 100_000;
        let source = vec![b'-'; DEPTH];
        let mut chain = Subtree::leaf(NodeKind::Identifier, Span::new(DEPTH - 1, DEPTH), loc());
        for start in (0..DEPTH - 1).rev() {
            chain = Subtree::with_children(
                NodeKind::UnaryOp(UnOp::Neg),
                Span::new(start, DEPTH),
                loc(),
                vec![chain],
            );
        }

        let mut tree = SyntaxTree::new(&source);
        let top = tree.attach(tree.root(), chain);
        assert_eq!(tree.len(), DEPTH + 1);
        assert_eq!(tree.children(top), &[top + 1]);
        let (deepest, depth) = tree.walk().last().unwrap();
        assert_eq!(tree.kind(deepest), NodeKind::Identifier);
        assert_eq!(depth, DEPTH);
    }

    #[test]
    fn test_tree_starting_at_offset() {
        let tree = SyntaxTree::starting_at(b"junk int", 5, SourceLocation::new(1, 6));
        assert_eq!(tree.span(tree.root()), Span::new(5, 8));
        assert_eq!(tree.text(tree.root()), b"int");
        assert_eq!(tree.node(tree.root()).location, SourceLocation::new(1, 6));
    }

    #[test]
    fn test_kind_counts() {
        let mut tree = SyntaxTree::new(b"  ;");
        let root = tree.root();
        tree.push(root, NodeKind::Space, Span::new(0, 2), loc());
        tree.push(root, NodeKind::EmptyDeclaration, Span::new(2, 3), loc());
        let counts = tree.kind_counts();
        assert_eq!(counts.get(&NodeKind::Space), Some(&1));
        assert_eq!(counts.get(&NodeKind::EmptyDeclaration), Some(&1));
        assert_eq!(counts.get(&NodeKind::Program), None);
    }

    #[test]
    fn test_directive_names() {
        assert_eq!(DirectiveKind::from_name(b"include"), DirectiveKind::Include);
        assert_eq!(DirectiveKind::from_name(b"pragma"), DirectiveKind::Pragma);
        assert_eq!(DirectiveKind::from_name(b"Include"), DirectiveKind::Unknown);
        assert_eq!(DirectiveKind::from_name(b""), DirectiveKind::Unknown);
    }

    #[test]
    fn test_span_helpers() {
        let span = Span::new(3, 7);
        assert_eq!(span.len(), 4);
        assert!(span.contains(3));
        assert!(!span.contains(7));
        assert_eq!(span.merge(Span::new(1, 4)), Span::new(1, 7));
        assert!(Span::new(2, 2).is_empty());
    }
}
