//! Renaming rules for declared names.

/// A name is exported when its first character is an upper-case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Computes the instance-specific name of every declared name.
#[derive(Clone, Debug)]
pub struct Mangler {
    template: String,
    instance: String,
    instance_exported: bool,
}

impl Mangler {
    pub fn new(template: impl Into<String>, instance: impl Into<String>) -> Self {
        let instance = instance.into();
        Mangler { template: template.into(), instance_exported: is_exported(&instance), instance }
    }

    pub fn mangle(&self, name: &str) -> String {
        let candidate = if name == self.template {
            self.instance.clone()
        } else if let Some(at) = self.find_template(name) {
            let inner = if at == 0 { self.instance.clone() } else { upper_first(&self.instance) };
            let mut out = String::with_capacity(name.len() + inner.len());
            out.push_str(&name[..at]);
            out.push_str(&inner);
            out.push_str(&name[at + self.template.len()..]);
            out
        } else {
            let mut out = name.to_string();
            out.push_str(&upper_first(&self.instance));
            out
        };

        if !self.instance_exported && is_exported(&candidate) {
            lower_first(&candidate)
        } else {
            candidate
        }
    }

    fn find_template(&self, name: &str) -> Option<usize> {
        if self.template.is_empty() { None } else { name.find(&self.template) }
    }
}
