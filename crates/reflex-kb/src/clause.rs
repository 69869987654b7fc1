//! Textual clause parser for inbound knowledge.
//!
//! Peers teach the agent by sending blobs of period-terminated clause
//! declarations, e.g.
//!
//! ```text
//! :- dynamic vision/2. vision(green,near). depth(far). load(full).
//! rule(patrol, and(vision(any,center), depth(far)), 'go:1').
//! ```
//!
//! Four clause kinds are recognised:
//!
//! | Form | Meaning |
//! |---|---|
//! | `:- …` | directive – skipped (peers prefix messages with `dynamic` declarations) |
//! | `pred(a1, …, aN)` | ground fact, asserted into the [`KnowledgeStore`](crate::KnowledgeStore) |
//! | `rule(Name, Guard, Template)` | register or override behavior `Name` |
//! | `action(Name, Template)` | replace only the action template of behavior `Name` |
//!
//! Guards compile to the [`Cond`] AST: a fact pattern such as
//! `vision(any, near)`, or the combinators `and(…)`, `or(…)`, `not(…)`.
//! The wildcard `any` (or `_`) matches any single argument value. Quoted
//! atoms (`'go:5'`) carry characters that are significant to the grammar.
//!
//! Parsing a blob is all-or-nothing: the first malformed clause rejects the
//! whole message, so a partially ill-formed message never half-loads.

use reflex_types::ReflexError;

use crate::rules::Cond;

/// A parsed term: the building block of clauses and guard patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// A ground value (bare or quoted atom).
    Atom(String),
    /// `any` / `_` – matches any single argument in a pattern.
    Wildcard,
    /// `functor(arg1, …, argN)`.
    Compound { functor: String, args: Vec<Term> },
}

impl Term {
    pub fn atom(s: impl Into<String>) -> Self {
        Term::Atom(s.into())
    }
}

/// One parsed clause, classified by what loading it means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// `:- …` – skipped at load time.
    Directive(String),
    /// Ground fact: assert `pred(args)` into the store.
    Fact { pred: String, args: Vec<String> },
    /// `rule(Name, Guard, Template)` – register-or-override a behavior.
    Rule {
        name: String,
        guard: Cond,
        template: String,
    },
    /// `action(Name, Template)` – template-only override.
    ActionOverride { name: String, template: String },
}

/// Parse a cleaned blob into its clauses.
///
/// # Errors
///
/// [`ReflexError::ClauseParse`] on the first malformed fragment; nothing
/// before it is returned (atomic per message).
pub fn parse_clauses(blob: &str) -> Result<Vec<Clause>, ReflexError> {
    let mut parser = Parser::new(blob);
    let mut clauses = Vec::new();
    loop {
        parser.skip_whitespace();
        if parser.at_end() {
            return Ok(clauses);
        }
        clauses.push(parser.clause()?);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Recursive-descent parser
// ────────────────────────────────────────────────────────────────────────────

struct Parser<'a> {
    src: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.chars().collect(),
            pos: 0,
        }
    }

    fn clause(&mut self) -> Result<Clause, ReflexError> {
        if self.eat_str(":-") {
            return self.directive();
        }
        let term = self.term()?;
        self.skip_whitespace();
        if !self.eat('.') {
            return Err(self.error("expected '.' after clause"));
        }
        classify(term)
    }

    /// Consume a directive body up to its terminating period.
    fn directive(&mut self) -> Result<Clause, ReflexError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\'' {
                self.quoted_atom()?;
                continue;
            }
            self.pos += 1;
            if c == '.' {
                let body: String = self.chars[start..self.pos - 1].iter().collect();
                return Ok(Clause::Directive(body.trim().to_string()));
            }
        }
        Err(self.error("unterminated directive"))
    }

    fn term(&mut self) -> Result<Term, ReflexError> {
        self.skip_whitespace();
        match self.peek() {
            Some('\'') => Ok(Term::Atom(self.quoted_atom()?)),
            Some('_') => {
                self.pos += 1;
                Ok(Term::Wildcard)
            }
            Some(c) if c.is_alphanumeric() => {
                let name = self.bare_atom();
                self.skip_whitespace();
                if !self.eat('(') {
                    if name == "any" {
                        return Ok(Term::Wildcard);
                    }
                    return Ok(Term::Atom(name));
                }
                let mut args = Vec::new();
                loop {
                    args.push(self.term()?);
                    self.skip_whitespace();
                    if self.eat(',') {
                        continue;
                    }
                    if self.eat(')') {
                        return Ok(Term::Compound { functor: name, args });
                    }
                    return Err(self.error("expected ',' or ')' in argument list"));
                }
            }
            Some(c) => Err(self.error(&format!("unexpected character {c:?}"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn bare_atom(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// `'…'` – any characters except the closing quote.
    fn quoted_atom(&mut self) -> Result<String, ReflexError> {
        debug_assert_eq!(self.peek(), Some('\''));
        self.pos += 1;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\'' {
                let atom: String = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                return Ok(atom);
            }
            self.pos += 1;
        }
        Err(self.error("unterminated quoted atom"))
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, expected: &str) -> bool {
        let end = self.pos + expected.chars().count();
        if end <= self.chars.len()
            && self.chars[self.pos..end].iter().collect::<String>() == expected
        {
            self.pos = end;
            true
        } else {
            false
        }
    }

    fn error(&self, reason: &str) -> ReflexError {
        // A short window around the failure position, enough to locate it.
        let snippet: String = self.src.chars().skip(self.pos.saturating_sub(12)).take(24).collect();
        ReflexError::ClauseParse {
            text: snippet,
            reason: reason.to_string(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Classification
// ────────────────────────────────────────────────────────────────────────────

fn classify(term: Term) -> Result<Clause, ReflexError> {
    match term {
        Term::Compound { functor, args } if functor == "rule" => {
            let [name, guard, template] = take3(&functor, args)?;
            Ok(Clause::Rule {
                name: ground_atom("rule name", name)?,
                guard: compile_guard(guard)?,
                template: ground_atom("rule template", template)?,
            })
        }
        Term::Compound { functor, args } if functor == "action" => {
            let [name, template] = take2(&functor, args)?;
            Ok(Clause::ActionOverride {
                name: ground_atom("behavior name", name)?,
                template: ground_atom("action template", template)?,
            })
        }
        Term::Compound { functor, args } => {
            let ground = args
                .into_iter()
                .map(|arg| ground_atom("fact argument", arg))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Clause::Fact {
                pred: functor,
                args: ground,
            })
        }
        // A bare atom is a zero-arity fact.
        Term::Atom(pred) => Ok(Clause::Fact {
            pred,
            args: Vec::new(),
        }),
        Term::Wildcard => Err(parse_err("_", "a clause cannot be a wildcard")),
    }
}

/// Compile a guard term into the [`Cond`] AST.
pub fn compile_guard(term: Term) -> Result<Cond, ReflexError> {
    match term {
        Term::Compound { functor, args } if functor == "and" => Ok(Cond::All(
            args.into_iter().map(compile_guard).collect::<Result<_, _>>()?,
        )),
        Term::Compound { functor, args } if functor == "or" => Ok(Cond::Any(
            args.into_iter().map(compile_guard).collect::<Result<_, _>>()?,
        )),
        Term::Compound { functor, mut args } if functor == "not" => {
            if args.len() != 1 {
                return Err(parse_err("not", "not/1 takes exactly one guard"));
            }
            Ok(Cond::Not(Box::new(compile_guard(args.remove(0))?)))
        }
        Term::Compound { functor, args } => {
            for arg in &args {
                if matches!(arg, Term::Compound { .. }) {
                    return Err(parse_err(&functor, "fact patterns take atoms or wildcards"));
                }
            }
            Ok(Cond::Fact {
                predicate: functor,
                pattern: args,
            })
        }
        Term::Atom(pred) => Ok(Cond::Fact {
            predicate: pred,
            pattern: Vec::new(),
        }),
        Term::Wildcard => Err(parse_err("_", "a guard cannot be a bare wildcard")),
    }
}

fn ground_atom(what: &str, term: Term) -> Result<String, ReflexError> {
    match term {
        Term::Atom(atom) => Ok(atom),
        other => Err(parse_err(
            &format!("{other:?}"),
            &format!("{what} must be a ground atom"),
        )),
    }
}

fn take2(functor: &str, args: Vec<Term>) -> Result<[Term; 2], ReflexError> {
    <[Term; 2]>::try_from(args)
        .map_err(|_| parse_err(functor, &format!("{functor}/2 takes exactly two arguments")))
}

fn take3(functor: &str, args: Vec<Term>) -> Result<[Term; 3], ReflexError> {
    <[Term; 3]>::try_from(args)
        .map_err(|_| parse_err(functor, &format!("{functor}/3 takes exactly three arguments")))
}

fn parse_err(text: &str, reason: &str) -> ReflexError {
    ReflexError::ClauseParse {
        text: text.to_string(),
        reason: reason.to_string(),
    }
}
