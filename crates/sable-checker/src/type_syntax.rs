//! Reader for type annotations written as text.
//!
//! Fixtures spell types the way source code does:
//!
//! ```text
//! type        := 'any'? composition
//! composition := postfix ('&' postfix)*
//! postfix     := primary ('?' | '!' | '.Type')*
//! primary     := '@Sendable'? '(' types? ')' 'async'? 'throws'? ('->' type)?
//!              | '[' type (':' type)? ']'
//!              | Name ('<' types '>')?
//! ```
//!
//! Names resolve against the generic parameters in scope, then the
//! key-path family, then built-in types, then declared definitions.

use rustc_hash::FxHashMap;
use sable_common::interner::Atom;
use sable_solver::recursion::{DepthCounter, RecursionProfile};
use sable_solver::{
    DefId, DefinitionStore, FunctionFlags, IntrinsicKind, KeyPathKind, Prelude, TypeData,
    TypeDatabase, TypeId,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeSyntaxErrorKind {
    UnexpectedEnd,
    UnexpectedToken(String),
    InvalidCharacter(char),
    UnknownType(String),
    NotAProtocol(String),
    WrongArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },
    /// `@Sendable` on something other than a function type.
    SendableNonFunction,
    TooDeep,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeSyntaxError {
    pub kind: TypeSyntaxErrorKind,
    /// Byte offset in the annotation text.
    pub offset: usize,
}

impl std::fmt::Display for TypeSyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            TypeSyntaxErrorKind::UnexpectedEnd => write!(f, "unexpected end of type")?,
            TypeSyntaxErrorKind::UnexpectedToken(token) => write!(f, "unexpected '{token}'")?,
            TypeSyntaxErrorKind::InvalidCharacter(c) => write!(f, "invalid character '{c}'")?,
            TypeSyntaxErrorKind::UnknownType(name) => write!(f, "cannot find type '{name}' in scope")?,
            TypeSyntaxErrorKind::NotAProtocol(name) => write!(f, "'{name}' is not a protocol")?,
            TypeSyntaxErrorKind::WrongArgumentCount {
                name,
                expected,
                found,
            } => write!(
                f,
                "generic type '{name}' specialized with {found} type argument(s), expected {expected}"
            )?,
            TypeSyntaxErrorKind::SendableNonFunction => {
                write!(f, "'@Sendable' only applies to function types")?;
            }
            TypeSyntaxErrorKind::TooDeep => write!(f, "type annotation is nested too deeply")?,
        }
        write!(f, " at offset {}", self.offset)
    }
}

impl std::error::Error for TypeSyntaxError {}

// =============================================================================
// Scanner
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Ident(String),
    At,
    LessThan,
    GreaterThan,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    Comma,
    Colon,
    Ampersand,
    Question,
    Exclamation,
    Dot,
    Arrow,
}

impl Token {
    fn text(&self) -> String {
        let text = match self {
            Self::Ident(name) => return name.clone(),
            Self::At => "@",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::OpenBracket => "[",
            Self::CloseBracket => "]",
            Self::OpenParen => "(",
            Self::CloseParen => ")",
            Self::Comma => ",",
            Self::Colon => ":",
            Self::Ampersand => "&",
            Self::Question => "?",
            Self::Exclamation => "!",
            Self::Dot => ".",
            Self::Arrow => "->",
        };
        text.to_string()
    }
}

fn scan(text: &str) -> Result<Vec<(Token, usize)>, TypeSyntaxError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            c if c.is_alphabetic() || c == '_' => {
                let mut name = String::from(c);
                while let Some(&(_, next)) = chars.peek() {
                    if !(next.is_alphanumeric() || next == '_') {
                        break;
                    }
                    name.push(next);
                    chars.next();
                }
                Token::Ident(name)
            }
            '@' => Token::At,
            '<' => Token::LessThan,
            '>' => Token::GreaterThan,
            '[' => Token::OpenBracket,
            ']' => Token::CloseBracket,
            '(' => Token::OpenParen,
            ')' => Token::CloseParen,
            ',' => Token::Comma,
            ':' => Token::Colon,
            '&' => Token::Ampersand,
            '?' => Token::Question,
            '!' => Token::Exclamation,
            '.' => Token::Dot,
            '-' if matches!(chars.peek(), Some((_, '>'))) => {
                chars.next();
                Token::Arrow
            }
            other => {
                return Err(TypeSyntaxError {
                    kind: TypeSyntaxErrorKind::InvalidCharacter(other),
                    offset,
                });
            }
        };
        tokens.push((token, offset));
    }
    Ok(tokens)
}

// =============================================================================
// Reader
// =============================================================================

/// Reads annotation text into interned types.
pub struct TypeSyntaxReader<'a> {
    db: &'a dyn TypeDatabase,
    defs: &'a DefinitionStore,
    prelude: Prelude,
    scope: FxHashMap<Atom, TypeId>,
}

impl<'a> TypeSyntaxReader<'a> {
    pub fn new(db: &'a dyn TypeDatabase, defs: &'a DefinitionStore, prelude: Prelude) -> Self {
        Self {
            db,
            defs,
            prelude,
            scope: FxHashMap::default(),
        }
    }

    /// Make generic parameters visible by name.
    pub fn with_scope(mut self, params: impl IntoIterator<Item = TypeId>) -> Self {
        for param in params {
            if let Some(TypeData::TypeParameter(info)) = self.db.lookup(param) {
                self.scope.insert(info.name, param);
            }
        }
        self
    }

    pub fn read(&self, text: &str) -> Result<TypeId, TypeSyntaxError> {
        let mut parser = self.parser(text)?;
        let ty = parser.parse_type()?;
        parser.expect_end()?;
        Ok(ty)
    }

    /// `T` or `T: Sendable & Hashable`, declared by `owner`.
    pub fn read_generic_parameter(
        &self,
        text: &str,
        owner: Option<DefId>,
    ) -> Result<TypeId, TypeSyntaxError> {
        let mut parser = self.parser(text)?;
        let name = parser.expect_ident()?;
        let mut constraints = Vec::new();
        if parser.eat(&Token::Colon) {
            loop {
                constraints.push(parser.parse_postfix()?);
                if !parser.eat(&Token::Ampersand) {
                    break;
                }
            }
        }
        parser.expect_end()?;
        Ok(self
            .db
            .type_param(self.db.intern_string(&name), owner, constraints))
    }

    /// `T: Sendable` in a `where` clause.
    pub fn read_requirement(&self, text: &str) -> Result<(TypeId, DefId), TypeSyntaxError> {
        let mut parser = self.parser(text)?;
        let subject = parser.parse_postfix()?;
        parser.expect(&Token::Colon)?;
        let offset = parser.offset();
        let name = parser.expect_ident()?;
        parser.expect_end()?;
        let protocol = self
            .defs
            .lookup_name(self.db.intern_string(&name))
            .filter(|&def| self.defs.is_protocol(def))
            .ok_or_else(|| TypeSyntaxError {
                kind: TypeSyntaxErrorKind::NotAProtocol(name.clone()),
                offset,
            })?;
        Ok((subject, protocol))
    }

    fn parser<'r>(&'r self, text: &str) -> Result<Parser<'r, 'a>, TypeSyntaxError> {
        Ok(Parser {
            reader: self,
            tokens: scan(text)?,
            pos: 0,
            end: text.len(),
            depth: DepthCounter::with_profile(RecursionProfile::TypeAnnotation),
        })
    }

    fn resolve_name(
        &self,
        name: &str,
        args: Vec<TypeId>,
        offset: usize,
    ) -> Result<TypeId, TypeSyntaxError> {
        let db = self.db;
        let arity_error = |expected: usize| TypeSyntaxError {
            kind: TypeSyntaxErrorKind::WrongArgumentCount {
                name: name.to_string(),
                expected,
                found: args.len(),
            },
            offset,
        };
        let atom = db.intern_string(name);

        if let Some(&param) = self.scope.get(&atom) {
            return if args.is_empty() {
                Ok(param)
            } else {
                Err(arity_error(0))
            };
        }
        if let Some(kind) = KeyPathKind::from_name(name) {
            if args.len() != kind.arity() {
                return Err(arity_error(kind.arity()));
            }
            let root = args.first().copied().unwrap_or(TypeId::NONE);
            let value = args.get(1).copied().unwrap_or(TypeId::NONE);
            return Ok(db.key_path(kind, root, value));
        }
        if let Some(kind) = IntrinsicKind::from_name(name) {
            return if args.is_empty() {
                Ok(kind.to_type_id())
            } else {
                Err(arity_error(0))
            };
        }
        let Some(def) = self.defs.lookup_name(atom) else {
            return Err(TypeSyntaxError {
                kind: TypeSyntaxErrorKind::UnknownType(name.to_string()),
                offset,
            });
        };
        let expected = self.defs.get_type_params(def).map_or(0, |params| params.len());
        if args.len() != expected {
            return Err(arity_error(expected));
        }
        Ok(db.nominal(def, args))
    }
}

struct Parser<'r, 'a> {
    reader: &'r TypeSyntaxReader<'a>,
    tokens: Vec<(Token, usize)>,
    pos: usize,
    end: usize,
    depth: DepthCounter,
}

impl Parser<'_, '_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |&(_, offset)| offset)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Some(Token::Ident(name)) if name == keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, kind: TypeSyntaxErrorKind) -> TypeSyntaxError {
        TypeSyntaxError {
            kind,
            offset: self.offset(),
        }
    }

    fn unexpected(&self) -> TypeSyntaxError {
        match self.peek() {
            Some(token) => self.error(TypeSyntaxErrorKind::UnexpectedToken(token.text())),
            None => self.error(TypeSyntaxErrorKind::UnexpectedEnd),
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), TypeSyntaxError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_ident(&mut self) -> Result<String, TypeSyntaxError> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn expect_end(&self) -> Result<(), TypeSyntaxError> {
        if self.pos == self.tokens.len() {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn parse_type(&mut self) -> Result<TypeId, TypeSyntaxError> {
        if !self.depth.enter() {
            return Err(self.error(TypeSyntaxErrorKind::TooDeep));
        }
        let result = self.parse_type_inner();
        self.depth.leave();
        result
    }

    fn parse_type_inner(&mut self) -> Result<TypeId, TypeSyntaxError> {
        let existential = self.eat_keyword("any");
        let mut members = vec![self.parse_postfix()?];
        while self.eat(&Token::Ampersand) {
            members.push(self.parse_postfix()?);
        }
        let ty = self.reader.db.composition(members);
        Ok(if existential {
            self.reader.db.existential(ty)
        } else {
            ty
        })
    }

    fn parse_postfix(&mut self) -> Result<TypeId, TypeSyntaxError> {
        let db = self.reader.db;
        let mut ty = self.parse_primary()?;
        loop {
            if self.eat(&Token::Question) || self.eat(&Token::Exclamation) {
                ty = self.reader.prelude.optional_of(db, ty);
            } else if self.peek() == Some(&Token::Dot) {
                self.pos += 1;
                if !self.eat_keyword("Type") {
                    return Err(self.unexpected());
                }
                ty = db.metatype(ty);
            } else {
                return Ok(ty);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<TypeId, TypeSyntaxError> {
        let db = self.reader.db;
        let offset = self.offset();
        match self.peek() {
            Some(Token::At) => {
                self.pos += 1;
                if !self.eat_keyword("Sendable") {
                    return Err(self.unexpected());
                }
                if self.peek() != Some(&Token::OpenParen) {
                    return Err(self.error(TypeSyntaxErrorKind::SendableNonFunction));
                }
                self.parse_parenthesized(FunctionFlags::SENDABLE)
            }
            Some(Token::OpenParen) => self.parse_parenthesized(FunctionFlags::empty()),
            Some(Token::OpenBracket) => {
                self.pos += 1;
                let first = self.parse_type()?;
                let ty = if self.eat(&Token::Colon) {
                    let value = self.parse_type()?;
                    self.reader.prelude.dictionary_of(db, first, value)
                } else {
                    self.reader.prelude.array_of(db, first)
                };
                self.expect(&Token::CloseBracket)?;
                Ok(ty)
            }
            Some(Token::Ident(_)) => {
                let name = self.expect_ident()?;
                let mut args = Vec::new();
                if self.eat(&Token::LessThan) {
                    loop {
                        args.push(self.parse_type()?);
                        if !self.eat(&Token::Comma) {
                            break;
                        }
                    }
                    self.expect(&Token::GreaterThan)?;
                }
                self.reader.resolve_name(&name, args, offset)
            }
            _ => Err(self.unexpected()),
        }
    }

    /// A tuple, a parenthesized type, or a function type.
    fn parse_parenthesized(&mut self, mut flags: FunctionFlags) -> Result<TypeId, TypeSyntaxError> {
        let db = self.reader.db;
        let sendable = flags.contains(FunctionFlags::SENDABLE);
        self.expect(&Token::OpenParen)?;
        let mut elements = Vec::new();
        if !self.eat(&Token::CloseParen) {
            loop {
                elements.push(self.parse_type()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::CloseParen)?;
        }
        if self.eat_keyword("async") {
            flags |= FunctionFlags::ASYNC;
        }
        if self.eat_keyword("throws") {
            flags |= FunctionFlags::THROWS;
        }
        if self.eat(&Token::Arrow) {
            let result = self.parse_type()?;
            return Ok(db.function(elements, result, flags));
        }
        if flags.intersects(FunctionFlags::ASYNC | FunctionFlags::THROWS) {
            return Err(self.unexpected());
        }
        if sendable {
            return Err(self.error(TypeSyntaxErrorKind::SendableNonFunction));
        }
        Ok(db.tuple(elements))
    }
}

#[cfg(test)]
#[path = "../tests/type_syntax_tests.rs"]
mod tests;
