//! The name → replacement table and its application to a tree.

use std::fmt::Write as _;

use log::debug;

use crate::error::TemplateError;
use crate::frontend::print_node;
use crate::frontend::span::Pos;
use crate::frontend::tree::Node;
use crate::middle::definition::TemplateDefinition;
use crate::middle::mangle::Mangler;
use crate::middle::prune::DeclaredNameRegistry;
use crate::middle::walk::{rewrite, subst};
use crate::utils::fast::{fast_map_with_cap, FastMap};

#[derive(Clone, Debug, Default)]
pub struct SubstitutionMapping {
    entries: Vec<(String, Node)>,
    index: FastMap<String, usize>,
}

impl SubstitutionMapping {
    /// Formal parameters map to the supplied arguments; every other declared
    /// name maps to its mangled form.
    pub fn build(
        def: &TemplateDefinition,
        args: &[Node],
        registry: &DeclaredNameRegistry,
        mangler: &Mangler,
    ) -> Result<Self, TemplateError> {
        if !registry.contains(&def.name) {
            return Err(TemplateError::definition(
                format!("no definition for template type '{}'", def.name),
                def.span,
            ));
        }
        if let Some(missing) = def.params.iter().find(|p| !registry.contains(p)) {
            return Err(TemplateError::definition(
                format!("template parameter '{missing}' is never declared"),
                def.span,
            ));
        }
        def.check_arity(args.len())?;

        let mut mapping = SubstitutionMapping {
            entries: Vec::with_capacity(registry.len()),
            index: fast_map_with_cap(registry.len()),
        };
        for (param, arg) in def.params.iter().zip(args) {
            mapping.insert(param, arg.clone());
        }
        for name in registry.iter() {
            if mapping.get(name).is_none() {
                mapping.insert(name, Node::ident(mangler.mangle(name), Pos::NONE));
            }
        }
        debug!("mapping:\n{}", mapping.table());
        Ok(mapping)
    }

    fn insert(&mut self, name: &str, replacement: Node) {
        match self.index.get(name) {
            Some(&i) => self.entries[i].1 = replacement,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), replacement));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), r))
    }

    /// Rewrite every mapped identifier in one pass, so no replacement is
    /// itself rewritten by a later entry.
    pub fn apply(&self, root: Node) -> Result<Node, TemplateError> {
        rewrite(root, &mut |n| match n {
            Node::Ident(id) => self.get(&id.name).map(|r| subst(r, id.pos)),
            _ => None,
        })
    }

    /// One `name -> replacement` line per entry.
    pub fn table(&self) -> String {
        let mut out = String::new();
        for (name, replacement) in self.iter() {
            let _ = writeln!(out, "{name} -> {}", print_node(replacement));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::tree::SyntaxTree;
    use crate::frontend::{parse_expr, parse_file, print_file};
    use crate::middle::definition::locate;
    use crate::middle::prune::prune;

    const SET: &str = "package set\n\n// template type Set(A)\ntype A int\n\ntype Set struct {\n\tm map[A]bool\n}\n\nfunc NewSet(a A) A {\n\treturn a\n}\n\nfunc UtilityFunc1() {}\n\nfunc (s *Set) Len() int {\n\treturn len(s.m)\n}\n";

    fn instantiate(src: &str, instance: &str, args: &[&str]) -> Result<String, TemplateError> {
        let mut tree = parse_file(src).expect("parse");
        let def = locate(&tree, "set.go")?;
        def.check_arity(args.len())?;
        let registry = prune(&mut tree, &def);
        let args: Vec<Node> = args.iter().map(|a| parse_expr(a).expect("arg")).collect();
        let mapping = SubstitutionMapping::build(&def, &args, &registry, &Mangler::new(&def.name, instance))?;
        let root = mapping.apply(tree.root)?;
        Ok(print_file(&SyntaxTree { root }))
    }

    #[test]
    fn exported_instance() {
        let out = instantiate(SET, "MySet", &["int"]).unwrap();
        assert!(out.contains("type MySet struct {\n\tm map[int]bool\n}"), "{out}");
        assert!(out.contains("func NewMySet(a int) int {"));
        assert!(out.contains("func UtilityFunc1MySet() {}"));
        assert!(out.contains("func (s *MySet) Len() int {"));
        assert!(!out.contains("type A"));
    }

    #[test]
    fn private_instance_unexports_everything() {
        let out = instantiate(SET, "mySet", &["string"]).unwrap();
        assert!(out.contains("type mySet struct {"), "{out}");
        assert!(out.contains("func newMySet(a string) string {"));
        assert!(out.contains("func utilityFunc1MySet() {}"));
        // methods keep their own names
        assert!(out.contains("func (s *mySet) Len() int {"));
    }

    #[test]
    fn function_arguments_are_inlined_at_call_sites() {
        let src = "package tt\n// template type TT(A, Less)\ntype A int\nfunc Less(a, b A) bool {\n\treturn a < b\n}\nfunc TT(a, b A) A {\n\tif Less(a, b) {\n\t\treturn a\n\t}\n\treturn b\n}\n";
        let out = instantiate(src, "Min", &["int8", "func(a int8, b int8) bool { return a < b }"]).unwrap();
        assert!(!out.contains("func Less"), "{out}");
        assert!(out.contains("func Min(a, b int8) int8 {"));
        assert!(out.contains("\tif func(a int8, b int8) bool { return a < b }(a, b) {"), "{out}");
    }

    #[test]
    fn template_name_must_be_declared() {
        let err = instantiate("package p\n// template type Box(A)\ntype A int\n", "IntBox", &["int"]).unwrap_err();
        assert!(err.to_string().contains("no definition for template type 'Box'"), "{err}");
    }

    #[test]
    fn params_must_be_declared() {
        let err = instantiate("package p\n// template type Box(A, B)\ntype A int\ntype Box []A\n", "X", &["int", "int"]).unwrap_err();
        assert!(matches!(err, TemplateError::Definition { .. }));
        assert!(err.to_string().contains("'B'"));
    }

    #[test]
    fn table_is_deterministic() {
        let tree = parse_file(SET).expect("parse");
        let def = locate(&tree, "set.go").unwrap();
        let tables: Vec<String> = (0..3)
            .map(|_| {
                let mut t = tree.clone();
                let reg = prune(&mut t, &def);
                let args = [parse_expr("int").unwrap()];
                SubstitutionMapping::build(&def, &args, &reg, &Mangler::new("Set", "MySet")).unwrap().table()
            })
            .collect();
        assert_eq!(tables[0], tables[1]);
        assert_eq!(tables[1], tables[2]);
        assert_eq!(tables[0], "A -> int\nSet -> MySet\nNewSet -> NewMySet\nUtilityFunc1 -> UtilityFunc1MySet\n");
    }

    #[test]
    fn swapping_names_is_order_independent() {
        // A -> B and B -> A must not chain into A -> A
        let mut m = SubstitutionMapping::default();
        m.insert("A", Node::ident("B", Pos::NONE));
        m.insert("B", Node::ident("A", Pos::NONE));
        let root = parse_file("package p\nvar x = f(A, B)\n").unwrap().root;
        let out = print_file(&SyntaxTree { root: m.apply(root).unwrap() });
        assert!(out.contains("var x = f(B, A)"), "{out}");
    }

    #[test]
    fn empty_mapping_is_identity() {
        let tree = parse_file(SET).expect("parse");
        let out = SubstitutionMapping::default().apply(tree.root.clone()).unwrap();
        assert!(out.same_shape(&tree.root));
        assert_eq!(print_file(&SyntaxTree { root: out }), SET);
    }
}
