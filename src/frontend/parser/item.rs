/* ================================
 * declarations
 * ================================ */

fn build_decl(p: Pair<Rule>) -> Result<Node, ParseError> {
    match p.as_rule() {
        Rule::import_decl => build_import(p),
        Rule::type_decl | Rule::value_decl => build_gen_decl(p),
        Rule::func_decl => build_func(p),
        other => Err(unexpected("declaration", other, &p)),
    }
}

fn build_import(p: Pair<Rule>) -> Result<Node, ParseError> {
    let mut keyword = None;
    let mut spec = Vec::new();
    for child in p.into_inner() {
        match child.as_rule() {
            Rule::kw_import => keyword = Some(Node::token(child.as_str(), pos_of(&child))),
            Rule::tail => spec = trim_spaces(build_items(child.into_inner())),
            other => return Err(unexpected("import", other, &child)),
        }
    }
    let keyword = keyword.ok_or_else(|| ParseError::at(Span::DUMMY, "import: missing keyword"))?;
    Ok(Aggregate::new(Kind::Import)
        .with("keyword", FieldMode::Fixed, keyword)
        .with("spec", FieldMode::Any, Node::Seq(spec))
        .into_node())
}

/// `var`, `const` and `type` declarations, single or grouped.
fn build_gen_decl(p: Pair<Rule>) -> Result<Node, ParseError> {
    let sp = sp_of(&p);
    let mut keyword = None;
    let mut grouped = false;
    let mut specs = Vec::new();

    for child in p.into_inner() {
        match child.as_rule() {
            Rule::kw_type | Rule::kw_value => {
                let kw = DeclKeyword::parse(child.as_str())
                    .ok_or_else(|| unexpected("declaration keyword", child.as_rule(), &child))?;
                keyword = Some((kw, Node::token(child.as_str(), pos_of(&child))));
            }
            Rule::type_spec => specs.push(build_type_spec(child)?),
            Rule::value_spec => specs.push(build_value_spec(child)?),
            Rule::type_group | Rule::value_group => {
                grouped = true;
                for line in child.into_inner() {
                    specs.push(build_group_line(line)?);
                }
            }
            other => return Err(unexpected("declaration", other, &child)),
        }
    }

    let (kw, kw_tok) = keyword.ok_or_else(|| ParseError::at(sp, "declaration: missing keyword"))?;
    Ok(Aggregate::new(Kind::GenDecl { keyword: kw, grouped })
        .with("keyword", FieldMode::Fixed, kw_tok)
        .with("specs", FieldMode::Any, Node::Seq(specs))
        .into_node())
}

/// One line of a `( ... )` group: a spec, a comment or nothing.
fn build_group_line(line: Pair<Rule>) -> Result<Node, ParseError> {
    let Some(part) = line.into_inner().next() else {
        return Ok(Node::Lit(Literal::Blank));
    };
    match part.as_rule() {
        Rule::type_spec => build_type_spec(part),
        Rule::value_spec => build_value_spec(part),
        Rule::line_comment => Ok(comment_of(&part)),
        other => Err(unexpected("group line", other, &part)),
    }
}

fn build_type_spec(p: Pair<Rule>) -> Result<Node, ParseError> {
    let sp = sp_of(&p);
    let mut name = None;
    let mut ty = Vec::new();
    for child in p.into_inner() {
        match child.as_rule() {
            Rule::ident => name = Some(ident_of(&child)),
            Rule::tail => ty = trim_spaces(build_items(child.into_inner())),
            other => return Err(unexpected("type spec", other, &child)),
        }
    }
    let name = name.ok_or_else(|| ParseError::at(sp, "type spec: missing name"))?;
    if ty.is_empty() {
        return Err(ParseError::at(sp, "type spec: missing type"));
    }
    Ok(Aggregate::new(Kind::TypeSpec)
        .with("name", FieldMode::Ident, name)
        .with("type", FieldMode::Any, Node::Slot(Box::new(Node::Seq(ty))))
        .with("scope", FieldMode::Any, Node::Ref(None))
        .into_node())
}

fn build_value_spec(p: Pair<Rule>) -> Result<Node, ParseError> {
    let sp = sp_of(&p);
    let mut names = Vec::new();
    let mut ty = Vec::new();
    let mut values = Vec::new();
    for child in p.into_inner() {
        match child.as_rule() {
            Rule::ident_list => {
                names = child
                    .into_inner()
                    .filter(|i| i.as_rule() == Rule::ident)
                    .map(|i| ident_of(&i))
                    .collect();
            }
            Rule::value_type => ty = trim_spaces(build_items(child.into_inner())),
            Rule::value_init => {
                values = child
                    .into_inner()
                    .filter(|e| e.as_rule() == Rule::expr)
                    .map(|e| Node::Slot(Box::new(Node::Seq(trim_spaces(build_items(e.into_inner()))))))
                    .collect();
            }
            other => return Err(unexpected("value spec", other, &child)),
        }
    }
    if names.is_empty() {
        return Err(ParseError::at(sp, "value spec: missing name"));
    }
    Ok(Aggregate::new(Kind::ValueSpec)
        .with("names", FieldMode::Ident, Node::Seq(names))
        .with("type", FieldMode::Any, Node::Slot(Box::new(Node::Seq(ty))))
        .with("values", FieldMode::Any, Node::Seq(values))
        .with("scope", FieldMode::Any, Node::Ref(None))
        .into_node())
}

fn build_func(p: Pair<Rule>) -> Result<Node, ParseError> {
    let sp = sp_of(&p);
    let mut keyword = None;
    let mut recv = Node::empty();
    let mut name = None;
    let mut signature = Vec::new();
    let mut body = Node::empty();

    for child in p.into_inner() {
        match child.as_rule() {
            Rule::kw_func => keyword = Some(Node::token(child.as_str(), pos_of(&child))),
            Rule::receiver => {
                if let Some(group) = child.into_inner().next() {
                    recv = build_group(group, Delim::Paren);
                }
            }
            Rule::ident => name = Some(ident_of(&child)),
            Rule::signature => signature = build_items(child.into_inner()),
            Rule::brace => body = build_group(child, Delim::Brace),
            other => return Err(unexpected("func", other, &child)),
        }
    }

    let keyword = keyword.ok_or_else(|| ParseError::at(sp, "func: missing keyword"))?;
    let name = name.ok_or_else(|| ParseError::at(sp, "func: missing name"))?;
    Ok(Aggregate::new(Kind::FuncDecl)
        .with("keyword", FieldMode::Fixed, keyword)
        .with("recv", FieldMode::Any, recv)
        .with("name", FieldMode::Ident, name)
        .with("signature", FieldMode::Any, Node::Seq(signature))
        .with("body", FieldMode::Any, body)
        .with("scope", FieldMode::Any, Node::Ref(None))
        .into_node())
}
