use convert_case::{Case, Casing};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternDef {
    pub name: String,
    pub pattern: String,
}

/// Appends a definition under a name no earlier definition uses. Unnamed
/// patterns are called `regex_<n>`, n being their 1-based position; a taken
/// name gets `_2`, `_3`, ... appended.
pub fn push_pattern_def(defs: &mut Vec<PatternDef>, name: Option<&str>, pattern: &str) {
    let base = match name {
        Some(name) => name.trim().to_case(Case::Snake),
        None => format!("regex {}", defs.len() + 1).to_case(Case::Snake),
    };

    let taken = |candidate: &str| defs.iter().any(|def| def.name == candidate);
    let mut name = base.clone();
    let mut suffix = 2;
    while taken(&name) {
        name = format!("{}_{}", base, suffix);
        suffix += 1;
    }

    defs.push(PatternDef {
        name,
        pattern: pattern.trim().to_string(),
    });
}

// one pattern per line, optionally `name: pattern`. blank lines and `#` comments are skipped
pub fn parse_pattern_defs(def_string: &str) -> Vec<PatternDef> {
    let mut defs = Vec::new();
    for line in def_string.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match line.split_once(':') {
            Some((name, pattern)) => push_pattern_def(&mut defs, Some(name), pattern),
            None => push_pattern_def(&mut defs, None, line),
        }
    }

    defs
}
