//! Print a syntax tree back to source text.
//!
//! Output is normalised the way `gofmt` would lay out the shapes we keep:
//! tab indentation, one space where the source had any whitespace, no
//! trailing spaces, at most one blank line in a row.

use crate::frontend::parser::{parse_file, ParseError};
use crate::frontend::tree::*;

/// Print a whole file.
pub fn print_file(tree: &SyntaxTree) -> String {
    let mut p = Printer::default();
    p.node(&tree.root);
    p.finish()
}

/// Print a single node (an argument, a declaration) without a trailing newline.
pub fn print_node(node: &Node) -> String {
    let mut p = Printer::default();
    p.node(node);
    p.out.trim_end().to_string()
}

/// Canonical layout of `src`: parsed and printed again, so whitespace inside
/// string literals and comments is left alone.
pub fn format_source(src: &str) -> Result<String, ParseError> {
    parse_file(src).map(|tree| print_file(&tree))
}

#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
    pending_space: bool,
    mid_line: bool,
    /// Extra indent of a declaration continued on the next line
    wrapped: usize,
}

impl Printer {
    /// Drop blank lines at both ends and end with one newline.
    fn finish(mut self) -> String {
        if self.mid_line {
            self.newline();
        }
        let body = self.out.trim_start_matches('\n').trim_end_matches('\n');
        if body.is_empty() {
            return String::new();
        }
        let mut out = String::with_capacity(body.len() + 1);
        out.push_str(body);
        out.push('\n');
        out
    }

    fn word(&mut self, text: &str) {
        if !self.mid_line {
            for _ in 0..self.indent + self.wrapped {
                self.out.push('\t');
            }
            self.mid_line = true;
        } else if self.pending_space {
            self.out.push(' ');
        }
        self.pending_space = false;
        self.out.push_str(text);
    }

    fn space(&mut self) {
        if self.mid_line {
            self.pending_space = true;
        }
    }

    fn newline(&mut self) {
        while self.out.ends_with([' ', '\t']) {
            self.out.pop();
        }
        self.out.push('\n');
        self.pending_space = false;
        self.mid_line = false;
    }

    /// Emit an empty line unless the previous one already was.
    fn blank(&mut self) {
        if self.mid_line {
            self.newline();
        }
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn file(&mut self, file: &Aggregate) {
        if let Some(header) = file.field("header") {
            self.top_items(header);
        }
        if let Some(Node::Ident(pkg)) = file.field("package") {
            self.word("package");
            self.space();
            self.word(&pkg.name);
            self.newline();
        }
        if let Some(decls) = file.field("decls") {
            self.top_items(decls);
        }
    }

    /// Top-level items and group specs: one per line.
    fn top_items(&mut self, items: &Node) {
        let Some(items) = items.as_seq() else { return };
        for item in items {
            match item {
                Node::Lit(Literal::Blank) => self.blank(),
                other => {
                    self.node(other);
                    self.newline();
                    self.wrapped = 0;
                }
            }
        }
    }

    fn node(&mut self, node: &Node) {
        match node {
            Node::Ident(id) => self.word(&id.name),
            Node::Seq(items) => items.iter().for_each(|n| self.node(n)),
            Node::Agg(agg) => self.aggregate(agg),
            Node::Slot(inner) => self.node(inner),
            Node::Ref(_) => {}
            Node::Lit(lit) => match lit {
                Literal::Token { text, .. } | Literal::Comment { text, .. } => self.word(text),
                Literal::Space => self.space(),
                Literal::Break => {
                    self.newline();
                    self.wrapped = 1;
                }
                Literal::Blank => {}
            },
        }
    }

    fn aggregate(&mut self, agg: &Aggregate) {
        match agg.kind {
            Kind::File => self.file(agg),
            Kind::Import => {
                self.word("import");
                self.space();
                self.field(agg, "spec");
            }
            Kind::GenDecl { keyword, grouped } => {
                self.word(keyword.as_str());
                self.space();
                if grouped {
                    self.word("(");
                    self.newline();
                    self.indent += 1;
                    if let Some(specs) = agg.field("specs").and_then(Node::as_seq) {
                        self.group_specs(specs);
                    }
                    self.indent -= 1;
                    self.word(")");
                } else {
                    self.field(agg, "specs");
                }
            }
            Kind::ValueSpec => {
                if let Some(names) = agg.field("names").and_then(Node::as_seq) {
                    for (i, name) in names.iter().enumerate() {
                        if i > 0 {
                            self.word(",");
                            self.space();
                        }
                        self.node(name);
                    }
                }
                if let Some(ty) = agg.field("type").filter(|t| !t.is_empty()) {
                    self.space();
                    self.node(ty);
                }
                if let Some(values) = agg.field("values").and_then(Node::as_seq).filter(|v| !v.is_empty()) {
                    self.space();
                    self.word("=");
                    self.space();
                    for (i, value) in values.iter().enumerate() {
                        if i > 0 {
                            self.word(",");
                            self.space();
                        }
                        self.node(value);
                    }
                }
            }
            Kind::TypeSpec => {
                self.field(agg, "name");
                self.space();
                self.field(agg, "type");
            }
            Kind::FuncDecl => {
                self.word("func");
                self.space();
                if let Some(recv) = agg.field("recv").filter(|r| !r.is_empty()) {
                    self.node(recv);
                    self.space();
                }
                self.field(agg, "name");
                self.field(agg, "signature");
                if let Some(body) = agg.field("body").filter(|b| !b.is_empty()) {
                    self.space();
                    self.node(body);
                }
            }
            Kind::Group(delim) => self.group(agg, delim),
        }
    }

    fn field(&mut self, agg: &Aggregate, name: &str) {
        if let Some(n) = agg.field(name) {
            self.node(n);
        }
    }

    /// Specs of a `var (...)`/`type (...)` group, blank lines collapsed and
    /// trimmed at both ends.
    fn group_specs(&mut self, specs: &[Node]) {
        let is_blank = |n: &Node| matches!(n, Node::Lit(Literal::Blank));
        let start = specs.iter().position(|n| !is_blank(n)).unwrap_or(specs.len());
        let end = specs.iter().rposition(|n| !is_blank(n)).map_or(start, |i| i + 1);
        for spec in &specs[start..end] {
            if is_blank(spec) {
                self.blank();
            } else {
                self.node(spec);
                self.newline();
                self.wrapped = 0;
            }
        }
    }

    fn group(&mut self, agg: &Aggregate, delim: Delim) {
        let lines: &[Node] = agg.field("lines").and_then(Node::as_seq).map(Vec::as_slice).unwrap_or(&[]);
        self.word(delim.open());
        if lines.len() <= 1 {
            lines.iter().for_each(|l| self.node(l));
            self.word(delim.close());
            return;
        }

        let (first, rest) = (&lines[0], &lines[1..]);
        let (last, middle) = match rest.split_last() {
            Some((last, middle)) => (last, middle),
            None => (first, &[][..]),
        };

        self.node(first);
        self.indent += 1;

        let start = middle.iter().position(|l| !l.is_empty()).unwrap_or(middle.len());
        let end = middle.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
        let mut prev_blank = false;
        for line in &middle[start..end] {
            if line.is_empty() {
                if !prev_blank {
                    self.newline();
                }
                prev_blank = true;
                continue;
            }
            prev_blank = false;
            self.newline();
            self.line(line);
        }

        if last.is_empty() {
            self.indent -= 1;
            self.newline();
        } else {
            self.newline();
            self.line(last);
            self.indent -= 1;
        }
        self.word(delim.close());
    }

    /// One line of a multi-line group; labels and `case`/`default` clauses
    /// sit one level left of the statements around them.
    fn line(&mut self, line: &Node) {
        if self.indent > 0 && is_outdented(line) {
            self.indent -= 1;
            self.node(line);
            self.indent += 1;
        } else {
            self.node(line);
        }
    }
}

fn is_outdented(line: &Node) -> bool {
    let Some(items) = line.as_seq() else { return false };
    let mut solid = items.iter().filter(|n| !matches!(n, Node::Lit(Literal::Space | Literal::Comment { .. })));
    let Some(Node::Ident(first)) = solid.next() else { return false };
    if first.name == "case" || first.name == "default" {
        return true;
    }
    matches!(solid.next(), Some(Node::Lit(Literal::Token { text, .. })) if text == ":") && solid.next().is_none()
}
