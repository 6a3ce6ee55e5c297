use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::locate::SyntaxNode;
use crate::span::Span;

macro_rules! node_kinds {
    ($($kind:ident),* $(,)?) => {
        /// Every kind of node the parser produces.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum NodeKind {
            $($kind,)*
        }

        impl NodeKind {
            pub const ALL: &'static [NodeKind] = &[$(NodeKind::$kind,)*];

            pub fn name(self) -> &'static str {
                match self {
                    $(NodeKind::$kind => stringify!($kind),)*
                }
            }
        }
    };
}

node_kinds! {
    CompilationUnit,
    PackageDeclaration,
    ImportDeclaration,
    ModuleDeclaration,
    ModuleDirective,
    TypeDeclaration,
    Annotation,
    ClassOrInterfaceDeclaration,
    EnumDeclaration,
    EnumConstant,
    ClassOrInterfaceBody,
    ClassOrInterfaceBodyDeclaration,
    Initializer,
    FieldDeclaration,
    MethodDeclaration,
    ConstructorDeclaration,
    FormalParameters,
    FormalParameter,
    Block,
    BlockStatement,
    LocalVariableDeclaration,
    VariableDeclarator,
    VariableDeclaratorId,
    VariableInitializer,
    ArrayInitializer,
    Statement,
    EmptyStatement,
    StatementExpression,
    IfStatement,
    WhileStatement,
    DoStatement,
    ForStatement,
    ForInit,
    ForUpdate,
    ReturnStatement,
    BreakStatement,
    ContinueStatement,
    ThrowStatement,
    AssertStatement,
    SwitchStatement,
    SwitchLabel,
    TryStatement,
    ResourceSpecification,
    Resource,
    CatchStatement,
    FinallyStatement,
    Expression,
    AssignmentExpression,
    ConditionalExpression,
    ConditionalOrExpression,
    ConditionalAndExpression,
    InclusiveOrExpression,
    ExclusiveOrExpression,
    AndExpression,
    EqualityExpression,
    InstanceOfExpression,
    RelationalExpression,
    ShiftExpression,
    AdditiveExpression,
    MultiplicativeExpression,
    UnaryExpression,
    UnaryExpressionNotPlusMinus,
    PreIncrementExpression,
    PreDecrementExpression,
    PostfixExpression,
    CastExpression,
    PrimaryExpression,
    PrimaryPrefix,
    PrimarySuffix,
    Arguments,
    ArgumentList,
    Literal,
    Name,
    AllocationExpression,
    ArrayDimsAndInits,
    MethodReference,
    LambdaExpression,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| format!("unknown node kind '{s}'"))
    }
}

/// A node of the parsed tree.
///
/// `image` holds the token text a node stands for when it has one: the
/// operator of a binary expression, a literal's spelling, a declared name
/// or a declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image: Option<String>,
    pub span: Span,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            image: None,
            span,
            children: Vec::new(),
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// A node wrapping exactly one child, spanning it.
    pub fn wrap(kind: NodeKind, child: Node) -> Self {
        let span = child.span;
        Self::new(kind, span).with_children(vec![child])
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind == kind
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    /// First node of `kind` in a depth-first, pre-order walk, `self`
    /// excluded.
    pub fn first_descendant(&self, kind: NodeKind) -> Option<&Node> {
        self.children.iter().find_map(|c| {
            if c.is(kind) {
                Some(c)
            } else {
                c.first_descendant(kind)
            }
        })
    }

    /// All descendants of `kind`, pre-order.
    pub fn descendants(&self, kind: NodeKind) -> Vec<&Node> {
        let mut found = Vec::new();
        crate::visit::walk(self, |n| {
            if n.is(kind) {
                found.push(n);
            }
        });
        found.retain(|n| !std::ptr::eq(*n, self));
        found
    }

    /// Indented text dump of this subtree, one node per line.
    pub fn dump(&self) -> String {
        crate::pretty::dump_tree(self)
    }
}

impl SyntaxNode for Node {
    fn num_children(&self) -> usize {
        self.children.len()
    }

    fn child(&self, index: usize) -> Option<&Self> {
        self.children.get(index)
    }
}
