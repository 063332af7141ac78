// Mon Jan 19 2026 - Alex

//! Just enough MSVC name demangling to tie a public symbol to the class it
//! belongs to.

/// Class-scoped member named by an MSVC-mangled symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedMember {
    /// Member name as the type dump spells it (`Bar`, `Base`, `~Base`, `operator=`).
    pub name: String,
    /// Mangled enclosing scope, innermost first, e.g. `Base@ns@@`.
    pub scope: String,
}

/// Mangled scope of a class's unique name: `.?AVBase@ns@@` -> `Base@ns@@`.
pub fn class_scope(unique_name: &str) -> Option<&str> {
    unique_name
        .strip_prefix(".?AV")
        .or_else(|| unique_name.strip_prefix(".?AU"))
        .filter(|scope| scope.ends_with("@@"))
}

pub fn demangle_member(mangled: &str) -> Option<ScopedMember> {
    MsvcDemangler::new(mangled).demangle()
}

enum Special {
    Constructor,
    Destructor,
    Operator(&'static str),
}

struct MsvcDemangler<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> MsvcDemangler<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn demangle(&mut self) -> Option<ScopedMember> {
        if self.peek()? != '?' {
            return None;
        }
        self.advance();

        if self.peek()? == '?' {
            self.advance();
            let special = self.parse_special_name()?;
            let scope_start = self.pos;
            let components = self.parse_scope()?;
            let class_name = components.first()?;

            let name = match special {
                Special::Constructor => class_name.to_string(),
                Special::Destructor => format!("~{}", class_name),
                Special::Operator(op) => {
                    // operators name their class only through the scope
                    let scope = &self.input[scope_start..self.pos];
                    return Some(ScopedMember {
                        name: op.to_string(),
                        scope: scope.to_string(),
                    });
                }
            };
            return Some(ScopedMember {
                name,
                scope: self.input[scope_start..self.pos].to_string(),
            });
        }

        let name = self.parse_simple_name()?;
        self.advance();
        let scope_start = self.pos;
        self.parse_scope()?;

        Some(ScopedMember {
            name,
            scope: self.input[scope_start..self.pos].to_string(),
        })
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Reads `A@B@...@@`, leaving the cursor after the closing `@@`. Nested
    /// or templated components are not handled.
    fn parse_scope(&mut self) -> Option<Vec<&'a str>> {
        let mut components = Vec::new();

        loop {
            match self.peek()? {
                '@' => {
                    self.advance();
                    break;
                }
                '?' => return None,
                _ => {
                    let component = self.parse_simple_name()?;
                    components.push(&self.input[self.pos - component.len()..self.pos]);
                    self.advance();
                }
            }
        }

        if components.is_empty() {
            None
        } else {
            Some(components)
        }
    }

    fn parse_simple_name(&mut self) -> Option<String> {
        let start = self.pos;

        while let Some(c) = self.peek() {
            if c == '@' {
                if self.pos == start {
                    return None;
                }
                return Some(self.input[start..self.pos].to_string());
            }
            if !(c.is_ascii_alphanumeric() || c == '_' || c == '$') {
                return None;
            }
            self.advance();
        }

        None
    }

    fn parse_special_name(&mut self) -> Option<Special> {
        let c = self.peek()?;
        self.advance();

        let special = match c {
            '0' => Special::Constructor,
            '1' => Special::Destructor,
            '2' => Special::Operator("operator new"),
            '3' => Special::Operator("operator delete"),
            '4' => Special::Operator("operator="),
            '5' => Special::Operator("operator>>"),
            '6' => Special::Operator("operator<<"),
            '7' => Special::Operator("operator!"),
            '8' => Special::Operator("operator=="),
            '9' => Special::Operator("operator!="),
            'A' => Special::Operator("operator[]"),
            'C' => Special::Operator("operator->"),
            'D' => Special::Operator("operator*"),
            'E' => Special::Operator("operator++"),
            'F' => Special::Operator("operator--"),
            'G' => Special::Operator("operator-"),
            'H' => Special::Operator("operator+"),
            _ => return None,
        };

        // the constructor/destructor name doubles as the innermost scope
        if matches!(special, Special::Operator(_)) || self.peek()? != '?' {
            Some(special)
        } else {
            None
        }
    }
}
