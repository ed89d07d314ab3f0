/* ================================
 * file / top-level lines
 * ================================ */

/// Parse one source unit.
pub fn parse_file(src: &str) -> Result<SyntaxTree, ParseError> {
    let mut pairs = GoParser::parse(Rule::file, src)?;
    let root = pairs
        .next()
        .ok_or_else(|| ParseError::at(Span::DUMMY, "empty source"))?;

    let mut top = TopLevel::default();
    for line in root.into_inner() {
        match line.as_rule() {
            Rule::top_line => top.push_line(line)?,
            Rule::EOI => {}
            other => return Err(unexpected("file", other, &line)),
        }
    }

    let package = top
        .package
        .ok_or_else(|| ParseError::at(Span { start: 0, end: src.len().min(1) }, "expected `package` clause"))?;
    let mut tree = SyntaxTree::new(top.header, package, top.decls);
    tree.link_scopes();
    Ok(tree)
}

#[derive(Default)]
struct TopLevel {
    /// Comments and blank lines before the package clause
    header: Vec<Node>,
    package: Option<Node>,
    decls: Vec<Node>,
}

impl TopLevel {
    fn target(&mut self) -> &mut Vec<Node> {
        if self.package.is_some() { &mut self.decls } else { &mut self.header }
    }

    fn push_line(&mut self, line: Pair<Rule>) -> Result<(), ParseError> {
        let mut parts = line.into_inner().peekable();
        if parts.peek().is_none() {
            self.target().push(Node::Lit(Literal::Blank));
            return Ok(());
        }
        for part in parts {
            match part.as_rule() {
                Rule::package_clause => {
                    if self.package.is_some() {
                        return Err(ParseError::at(sp_of(&part), "duplicate `package` clause"));
                    }
                    let name = part
                        .into_inner()
                        .find(|p| p.as_rule() == Rule::ident)
                        .ok_or_else(|| ParseError::at(Span::DUMMY, "package clause: missing name"))?;
                    self.package = Some(ident_of(&name));
                }
                Rule::line_comment | Rule::block_comment => {
                    let c = comment_of(&part);
                    self.target().push(c);
                }
                Rule::import_decl | Rule::type_decl | Rule::value_decl | Rule::func_decl => {
                    if self.package.is_none() {
                        return Err(ParseError::at(sp_of(&part), "expected `package` clause before declarations"));
                    }
                    self.decls.push(build_decl(part)?);
                }
                other => return Err(unexpected("top_line", other, &part)),
            }
        }
        Ok(())
    }
}
