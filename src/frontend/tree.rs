//! Syntax tree for one template source unit.
//!
//! The tree is a closed set of node shapes. Everything the substitution engine
//! needs to know about a node is visible in its variant, so the walker in
//! `middle::walk` can be an exhaustive match instead of a runtime type probe.
//!
//! Declarations are `Agg` nodes; everything below declaration level (types,
//! signatures, bodies, initialisers) is kept as token lines and bracketed
//! `Group`s, which is enough to rename identifiers and print the unit back.

use crate::frontend::span::Pos;

#[derive(Clone, Debug)]
pub enum Node {
    /// A name, with the position it was read from
    Ident(Ident),
    /// Ordered children: token lines, declaration lists, name lists
    Seq(Vec<Node>),
    /// Named fields
    Agg(Box<Aggregate>),
    /// Holds exactly one node whose shape varies (a type, an initialiser)
    Slot(Box<Node>),
    /// Non-owning back-link; `None` once the link has been invalidated
    Ref(Option<NodeRef>),
    /// Opaque leaf
    Lit(Literal),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub pos: Pos,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Literal {
    /// Keyword, operator, number, string or rune
    Token { text: String, pos: Pos },
    /// `// ...` or `/* ... */`, verbatim
    Comment { text: String, pos: Pos },
    /// Whitespace between two tokens on the same line
    Space,
    /// Line break inside a declaration that continues on the next line
    Break,
    /// An empty line between declarations
    Blank,
}

/// Target of a `Node::Ref`: the enclosing file or a top-level declaration by index.
///
/// Specs point at the declaration that contains them, so following a
/// reference from inside a declaration leads back to an ancestor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeRef {
    File,
    Decl(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delim {
    Paren,
    Bracket,
    Brace,
}

impl Delim {
    pub fn open(self) -> &'static str {
        match self {
            Delim::Paren => "(",
            Delim::Bracket => "[",
            Delim::Brace => "{",
        }
    }

    pub fn close(self) -> &'static str {
        match self {
            Delim::Paren => ")",
            Delim::Bracket => "]",
            Delim::Brace => "}",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclKeyword {
    Var,
    Const,
    Type,
}

impl DeclKeyword {
    pub fn parse(s: &str) -> Option<DeclKeyword> {
        match s {
            "var" => Some(DeclKeyword::Var),
            "const" => Some(DeclKeyword::Const),
            "type" => Some(DeclKeyword::Type),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeclKeyword::Var => "var",
            DeclKeyword::Const => "const",
            DeclKeyword::Type => "type",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// `package` clause + top-level items
    File,
    /// `import ...`, kept as a token line
    Import,
    /// `var`, `const` or `type`, with or without a parenthesised group
    GenDecl { keyword: DeclKeyword, grouped: bool },
    ValueSpec,
    TypeSpec,
    FuncDecl,
    /// Bracketed token lines
    Group(Delim),
}

/// How a field may be written during substitution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldMode {
    /// Any node may be stored
    Any,
    /// Only identifiers (or a sequence of them) may be stored
    Ident,
    /// Embedded by copy; never rewritten
    Fixed,
}

#[derive(Clone, Debug)]
pub struct Field {
    pub name: &'static str,
    pub mode: FieldMode,
    pub value: Node,
}

#[derive(Clone, Debug)]
pub struct Aggregate {
    pub kind: Kind,
    pub fields: Vec<Field>,
}

impl Aggregate {
    pub fn new(kind: Kind) -> Self {
        Aggregate { kind, fields: Vec::new() }
    }

    pub fn with(mut self, name: &'static str, mode: FieldMode, value: Node) -> Self {
        self.fields.push(Field { name, mode, value });
        self
    }

    pub fn field(&self, name: &str) -> Option<&Node> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.fields.iter_mut().find(|f| f.name == name).map(|f| &mut f.value)
    }

    /// Name carried by a `TypeSpec` or `FuncDecl`
    pub fn name(&self) -> Option<&str> {
        self.field("name").and_then(Node::as_ident).map(|id| id.name.as_str())
    }

    pub fn into_node(self) -> Node {
        Node::Agg(Box::new(self))
    }
}

impl Node {
    pub fn ident(name: impl Into<String>, pos: Pos) -> Node {
        Node::Ident(Ident { name: name.into(), pos })
    }

    pub fn token(text: impl Into<String>, pos: Pos) -> Node {
        Node::Lit(Literal::Token { text: text.into(), pos })
    }

    pub fn empty() -> Node {
        Node::Seq(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Node::Seq(items) => items.iter().all(Node::is_empty),
            Node::Slot(inner) => inner.is_empty(),
            Node::Lit(Literal::Space) => true,
            _ => false,
        }
    }

    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Node::Ident(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_seq_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_agg(&self) -> Option<&Aggregate> {
        match self {
            Node::Agg(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_agg_mut(&mut self) -> Option<&mut Aggregate> {
        match self {
            Node::Agg(a) => Some(a),
            _ => None,
        }
    }

    /// If this node is a single identifier once spaces are ignored, return it.
    pub fn bare_ident(&self) -> Option<&Ident> {
        match self {
            Node::Ident(id) => Some(id),
            Node::Slot(inner) => inner.bare_ident(),
            Node::Seq(items) => {
                let mut solid = items.iter().filter(|n| !n.is_empty());
                match (solid.next(), solid.next()) {
                    (Some(only), None) => only.bare_ident(),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Visit every comment in the subtree, in source order.
    pub fn for_each_comment<'a>(&'a self, f: &mut impl FnMut(&'a str, Pos)) {
        match self {
            Node::Lit(Literal::Comment { text, pos }) => f(text, *pos),
            Node::Seq(items) => items.iter().for_each(|n| n.for_each_comment(f)),
            Node::Agg(agg) => agg.fields.iter().for_each(|fl| fl.value.for_each_comment(f)),
            Node::Slot(inner) => inner.for_each_comment(f),
            Node::Ident(_) | Node::Ref(_) | Node::Lit(_) => {}
        }
    }

    /// Structural equality that ignores positions and back-references.
    pub fn same_shape(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Ident(a), Node::Ident(b)) => a.name == b.name,
            (Node::Seq(a), Node::Seq(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
            }
            (Node::Agg(a), Node::Agg(b)) => {
                a.kind == b.kind
                    && a.fields.len() == b.fields.len()
                    && a.fields.iter().zip(&b.fields).all(|(x, y)| {
                        x.name == y.name && x.mode == y.mode && x.value.same_shape(&y.value)
                    })
            }
            (Node::Slot(a), Node::Slot(b)) => a.same_shape(b),
            (Node::Ref(_), Node::Ref(_)) => true,
            (Node::Lit(a), Node::Lit(b)) => match (a, b) {
                (Literal::Token { text: x, .. }, Literal::Token { text: y, .. }) => x == y,
                (Literal::Comment { text: x, .. }, Literal::Comment { text: y, .. }) => x == y,
                (Literal::Space, Literal::Space)
                | (Literal::Break, Literal::Break)
                | (Literal::Blank, Literal::Blank) => true,
                _ => false,
            },
            _ => false,
        }
    }
}

/// One parsed source unit; the root is always a `File` aggregate.
#[derive(Clone, Debug)]
pub struct SyntaxTree {
    pub root: Node,
}

impl SyntaxTree {
    pub fn new(header: Vec<Node>, package: Node, decls: Vec<Node>) -> Self {
        let file = Aggregate::new(Kind::File)
            .with("header", FieldMode::Any, Node::Seq(header))
            .with("package", FieldMode::Ident, package)
            .with("decls", FieldMode::Any, Node::Seq(decls));
        SyntaxTree { root: file.into_node() }
    }

    fn file(&self) -> Option<&Aggregate> {
        self.root.as_agg().filter(|a| a.kind == Kind::File)
    }

    pub fn package_name(&self) -> Option<&str> {
        self.file()
            .and_then(|f| f.field("package"))
            .and_then(Node::as_ident)
            .map(|id| id.name.as_str())
    }

    /// Replace the package clause name, keeping its position.
    pub fn set_package(&mut self, name: &str) {
        if let Some(Node::Ident(id)) = self.root.as_agg_mut().and_then(|f| f.field_mut("package")) {
            id.name = name.to_string();
        }
    }

    /// Comments and blank lines above the package clause
    pub fn header(&self) -> &[Node] {
        self.file()
            .and_then(|f| f.field("header"))
            .and_then(Node::as_seq)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn decls(&self) -> &[Node] {
        self.file()
            .and_then(|f| f.field("decls"))
            .and_then(Node::as_seq)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn decls_mut(&mut self) -> Option<&mut Vec<Node>> {
        self.root
            .as_agg_mut()
            .filter(|a| a.kind == Kind::File)
            .and_then(|f| f.field_mut("decls"))
            .and_then(Node::as_seq_mut)
    }

    /// Point every declaration's `scope` back at its container: functions at
    /// the file, specs at the declaration holding them. Must be redone after
    /// the declaration list changes.
    pub fn link_scopes(&mut self) {
        let Some(decls) = self.decls_mut() else { return };
        for (i, decl) in decls.iter_mut().enumerate() {
            let Some(agg) = decl.as_agg_mut() else { continue };
            match agg.kind {
                Kind::FuncDecl => {
                    if let Some(scope) = agg.field_mut("scope") {
                        *scope = Node::Ref(Some(NodeRef::File));
                    }
                }
                Kind::GenDecl { .. } => {
                    let Some(specs) = agg.field_mut("specs").and_then(Node::as_seq_mut) else { continue };
                    for spec in specs.iter_mut().filter_map(Node::as_agg_mut) {
                        if let Some(scope) = spec.field_mut("scope") {
                            *scope = Node::Ref(Some(NodeRef::Decl(i)));
                        }
                    }
                }
                _ => {}
            }
        }
    }

    pub fn comments(&self) -> Vec<(&str, Pos)> {
        let mut out = Vec::new();
        self.root.for_each_comment(&mut |text, pos| out.push((text, pos)));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_ident_skips_spaces() {
        let n = Node::Seq(vec![
            Node::Lit(Literal::Space),
            Node::ident("A", Pos::from_offset(3)),
            Node::Lit(Literal::Space),
        ]);
        assert_eq!(n.bare_ident().map(|i| i.name.as_str()), Some("A"));

        let two = Node::Seq(vec![Node::ident("A", Pos::NONE), Node::token(".", Pos::NONE)]);
        assert!(two.bare_ident().is_none());
    }

    #[test]
    fn same_shape_ignores_positions_and_refs() {
        let a = Node::Seq(vec![Node::ident("x", Pos::from_offset(1)), Node::Ref(Some(NodeRef::File))]);
        let b = Node::Seq(vec![Node::ident("x", Pos::NONE), Node::Ref(None)]);
        assert!(a.same_shape(&b));
        let c = Node::Seq(vec![Node::ident("y", Pos::NONE), Node::Ref(None)]);
        assert!(!a.same_shape(&c));
    }

    #[test]
    fn package_can_be_renamed() {
        let mut t = SyntaxTree::new(vec![], Node::ident("tt", Pos::from_offset(8)), vec![]);
        assert_eq!(t.package_name(), Some("tt"));
        t.set_package("main");
        assert_eq!(t.package_name(), Some("main"));
    }
}
