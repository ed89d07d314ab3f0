//! Generic substitution over the closed node model.
//!
//! Back-references are never followed: any `Ref` passing through a rewrite or
//! a copy comes out as `Ref(None)`, which is what keeps the walk finite on
//! trees whose scopes point back at their ancestors.

use crate::error::TemplateError;
use crate::frontend::span::Pos;
use crate::frontend::tree::*;

/// What a child position is allowed to hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accept {
    Any,
    Ident,
}

impl From<FieldMode> for Accept {
    fn from(mode: FieldMode) -> Self {
        match mode {
            FieldMode::Ident => Accept::Ident,
            FieldMode::Any | FieldMode::Fixed => Accept::Any,
        }
    }
}

/// Rewrite every direct child of `node` with `f`.
///
/// `accept` is what `node` itself may hold; sequence elements inherit it,
/// aggregate fields use their own mode and slot contents accept anything.
pub fn apply<F>(node: Node, accept: Accept, f: &mut F) -> Result<Node, TemplateError>
where
    F: FnMut(Node, Accept) -> Result<Node, TemplateError>,
{
    match node {
        Node::Ident(_) | Node::Lit(_) => Ok(node),
        Node::Ref(_) => Ok(Node::Ref(None)),
        Node::Seq(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(child(item, accept, f, "sequence", "element")?);
            }
            Ok(Node::Seq(out))
        }
        Node::Slot(inner) => Ok(Node::Slot(Box::new(child(*inner, Accept::Any, f, "slot", "value")?))),
        Node::Agg(mut agg) => {
            let kind = agg.kind;
            for field in agg.fields.iter_mut() {
                if field.mode == FieldMode::Fixed {
                    continue;
                }
                let old = std::mem::replace(&mut field.value, Node::Ref(None));
                field.value = child(old, field.mode.into(), f, kind_name(kind), field.name)?;
            }
            Ok(Node::Agg(agg))
        }
    }
}

fn child<F>(node: Node, accept: Accept, f: &mut F, owner: &str, field: &str) -> Result<Node, TemplateError>
where
    F: FnMut(Node, Accept) -> Result<Node, TemplateError>,
{
    if matches!(node, Node::Ref(_)) {
        return Ok(Node::Ref(None));
    }
    let new = f(node, accept)?;
    set(accept, new, owner, field)
}

/// Store `node` into a position that accepts `accept`.
fn set(accept: Accept, node: Node, owner: &str, field: &str) -> Result<Node, TemplateError> {
    if accept == Accept::Ident && !holds_idents(&node) {
        return Err(TemplateError::Internal(format!(
            "cannot store `{}` in identifier field `{}` of {}",
            crate::frontend::print_node(&node),
            field,
            owner
        )));
    }
    Ok(node)
}

fn holds_idents(node: &Node) -> bool {
    match node {
        Node::Ident(_) => true,
        Node::Seq(items) => items.iter().all(|n| matches!(n, Node::Ident(_))),
        _ => false,
    }
}

fn kind_name(kind: Kind) -> &'static str {
    match kind {
        Kind::File => "file",
        Kind::Import => "import",
        Kind::GenDecl { keyword, .. } => keyword.as_str(),
        Kind::ValueSpec => "value spec",
        Kind::TypeSpec => "type spec",
        Kind::FuncDecl => "func",
        Kind::Group(_) => "group",
    }
}

/// Post-order rewrite of every node below `root`.
///
/// `visit` sees each node after its children were rewritten; a returned
/// replacement is stored in place and not walked again.
pub fn rewrite<V>(root: Node, visit: &mut V) -> Result<Node, TemplateError>
where
    V: FnMut(&Node) -> Option<Node>,
{
    apply(root, Accept::Any, &mut |n, a| rewrite_below(n, a, &mut *visit))
}

fn rewrite_below<V>(node: Node, accept: Accept, visit: &mut V) -> Result<Node, TemplateError>
where
    V: FnMut(&Node) -> Option<Node>,
{
    let node = apply(node, accept, &mut |n, a| rewrite_below(n, a, &mut *visit))?;
    Ok(visit(&node).unwrap_or(node))
}

/// Replace every identifier called `name` with a copy of `replacement`
/// stamped with that identifier's position.
pub fn rewrite_ident(root: Node, name: &str, replacement: &Node) -> Result<Node, TemplateError> {
    rewrite(root, &mut |n| match n {
        Node::Ident(id) if id.name == name => Some(subst(replacement, id.pos)),
        _ => None,
    })
}

/// Deep copy of `pattern` where every valid position becomes `pos`.
pub fn subst(pattern: &Node, pos: Pos) -> Node {
    match pattern {
        Node::Ident(id) => Node::Ident(Ident { name: id.name.clone(), pos: restamp(id.pos, pos) }),
        Node::Seq(items) => Node::Seq(items.iter().map(|n| subst(n, pos)).collect()),
        Node::Agg(agg) => {
            let fields = agg
                .fields
                .iter()
                .map(|fl| Field { name: fl.name, mode: fl.mode, value: subst(&fl.value, pos) })
                .collect();
            Node::Agg(Box::new(Aggregate { kind: agg.kind, fields }))
        }
        Node::Slot(inner) => Node::Slot(Box::new(subst(inner, pos))),
        Node::Ref(_) => Node::Ref(None),
        Node::Lit(lit) => Node::Lit(match lit {
            Literal::Token { text, pos: old } => Literal::Token { text: text.clone(), pos: restamp(*old, pos) },
            Literal::Comment { text, pos: old } => Literal::Comment { text: text.clone(), pos: restamp(*old, pos) },
            Literal::Space => Literal::Space,
            Literal::Break => Literal::Break,
            Literal::Blank => Literal::Blank,
        }),
    }
}

#[inline]
fn restamp(old: Pos, new: Pos) -> Pos {
    if old.is_valid() { new } else { Pos::NONE }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::{parse_file, parse_expr, print_file};

    fn id(name: &str, at: usize) -> Node {
        Node::ident(name, Pos::from_offset(at))
    }

    fn positions(n: &Node, out: &mut Vec<Pos>) {
        match n {
            Node::Ident(i) => out.push(i.pos),
            Node::Lit(Literal::Token { pos, .. }) => out.push(*pos),
            Node::Seq(items) => items.iter().for_each(|c| positions(c, out)),
            Node::Agg(a) => a.fields.iter().for_each(|f| positions(&f.value, out)),
            Node::Slot(inner) => positions(inner, out),
            _ => {}
        }
    }

    #[test]
    fn replaces_identifiers_everywhere() {
        let tree = parse_file("package p\n\ntype T struct {\n\tm map[A][]A\n}\n\nfunc F(a A) A {\n\treturn g(A(a))\n}\n").unwrap();
        let out = rewrite_ident(tree.root, "A", &Node::ident("int", Pos::NONE)).unwrap();
        let text = print_file(&SyntaxTree { root: out });
        assert!(!text.contains('A'), "{text}");
        assert!(text.contains("m map[int][]int"));
        assert!(text.contains("func F(a int) int {"));
    }

    #[test]
    fn self_referential_refs_come_out_empty() {
        let agg = Aggregate::new(Kind::TypeSpec)
            .with("name", FieldMode::Ident, id("A", 10))
            .with("type", FieldMode::Any, Node::Slot(Box::new(id("A", 12))))
            .with("scope", FieldMode::Any, Node::Ref(Some(NodeRef::Decl(0))));
        let root = Node::Seq(vec![agg.into_node(), Node::Ref(Some(NodeRef::File))]);
        let out = rewrite_ident(root, "A", &Node::ident("B", Pos::NONE)).unwrap();

        let items = out.as_seq().unwrap();
        assert!(matches!(items[1], Node::Ref(None)));
        let spec = items[0].as_agg().unwrap();
        assert!(matches!(spec.field("scope"), Some(Node::Ref(None))));
        assert_eq!(spec.name(), Some("B"));
    }

    #[test]
    fn fixed_fields_are_skipped() {
        let agg = Aggregate::new(Kind::Import)
            .with("keyword", FieldMode::Fixed, id("A", 1))
            .with("spec", FieldMode::Any, id("A", 3));
        let out = rewrite_ident(agg.into_node(), "A", &Node::ident("B", Pos::NONE)).unwrap();
        let agg = out.as_agg().unwrap();
        assert_eq!(agg.field("keyword").and_then(Node::as_ident).map(|i| i.name.as_str()), Some("A"));
        assert_eq!(agg.field("spec").and_then(Node::as_ident).map(|i| i.name.as_str()), Some("B"));
    }

    #[test]
    fn non_identifier_in_name_field_is_internal_error() {
        let agg = Aggregate::new(Kind::TypeSpec)
            .with("name", FieldMode::Ident, id("A", 5))
            .with("type", FieldMode::Any, Node::Slot(Box::new(id("int", 7))));
        let replacement = parse_expr("map[string]int").unwrap();
        let err = rewrite_ident(agg.into_node(), "A", &replacement).unwrap_err();
        assert!(matches!(err, TemplateError::Internal(_)));
        assert!(err.to_string().contains("name"), "{err}");
    }

    #[test]
    fn subst_restamps_only_valid_positions() {
        let pattern = Node::Seq(vec![id("x", 0), Node::ident("y", Pos::NONE), Node::token("+", Pos::from_offset(4))]);
        let at = Pos::from_offset(99);
        let mut seen = Vec::new();
        positions(&subst(&pattern, at), &mut seen);
        assert_eq!(seen, vec![at, Pos::NONE, at]);
    }

    #[test]
    fn replacements_are_not_revisited() {
        // A -> A.B would loop forever if the replacement were walked again
        let repl = parse_expr("A.B").unwrap();
        let out = rewrite_ident(Node::Seq(vec![id("A", 1)]), "A", &repl).unwrap();
        assert_eq!(crate::frontend::print_node(&out), "A.B");
    }

    #[test]
    fn root_is_not_visited() {
        let out = rewrite_ident(id("A", 1), "A", &Node::ident("B", Pos::NONE)).unwrap();
        assert_eq!(out.as_ident().map(|i| i.name.as_str()), Some("A"));
    }
}
