use std::{
    num::{ParseFloatError, ParseIntError},
    sync::Arc,
};

use miette::{Severity, SourceSpan};

use winnow::{
    ascii::{digit1, hex_digit1, oct_digit1},
    combinator::{alt, cut_err, delimited, eof, opt, peek, preceded, repeat, repeat_till, separated, terminated},
    error::{AddContext, ErrMode, ErrorKind, ParserError},
    error::FromExternalError,
    prelude::*,
    stream::{AsChar, Stateful, Stream},
    token::{none_of, one_of, take_till, take_while},
    Located,
};

use crate::{IniContainer, IniDiagnostic, IniErrorKind, IniItem, IniParseFailure, IniValue};

#[cfg(test)]
use crate::DEFAULT_NESTING_LIMIT;

/// Tracks how deep inside composite literals the parser currently is, so
/// that adversarial input fails with a diagnostic instead of blowing the
/// stack.
#[derive(Debug, Clone)]
pub(crate) struct ParseState {
    depth: usize,
    max_depth: usize,
}

type Input<'a> = Stateful<Located<&'a str>, ParseState>;
type PResult<T> = winnow::PResult<T, IniParseError>;

/// Parses a whole config document into its root container.
pub(crate) fn parse_document(
    input: &str,
    max_depth: usize,
) -> Result<IniContainer, IniParseFailure> {
    let events = try_parse(events, input, max_depth)?;
    build(events, input)
}

/// Parses a single literal value, entire-input.
pub(crate) fn parse_value(input: &str, max_depth: usize) -> Result<IniValue, IniParseFailure> {
    try_parse(delimited(sp, expr, sp), input, max_depth)
}

fn try_parse<'a, P: Parser<Input<'a>, T, IniParseError>, T>(
    mut parser: P,
    input: &'a str,
    max_depth: usize,
) -> Result<T, IniParseFailure> {
    let stream = Stateful {
        input: Located::new(input),
        state: ParseState {
            depth: 0,
            max_depth,
        },
    };
    parser.parse(stream).map_err(|e| {
        let offset = e.offset();
        failure_from_err(e.into_inner(), offset, input)
    })
}

fn failure_from_err(e: IniParseError, offset: usize, input: &str) -> IniParseFailure {
    let src = Arc::new(String::from(input));
    let offset = offset.min(input.len());
    let span = e.span.unwrap_or_else(|| {
        let len = usize::from(offset < input.len());
        (offset..offset + len).into()
    });
    IniParseFailure {
        input: src.clone(),
        diagnostics: vec![IniDiagnostic {
            input: src,
            span,
            label: e.label.map(String::from),
            help: e.help.map(String::from),
            severity: Severity::Error,
            kind: if let Some(kind) = e.kind {
                kind
            } else if let Some(ctx) = e.context {
                IniErrorKind::Context(ctx)
            } else {
                IniErrorKind::Other
            },
        }],
    }
}

fn structural_failure(
    input: &str,
    span: SourceSpan,
    kind: IniErrorKind,
    label: &str,
    help: &str,
) -> IniParseFailure {
    let src = Arc::new(String::from(input));
    IniParseFailure {
        input: src.clone(),
        diagnostics: vec![IniDiagnostic {
            input: src,
            span,
            label: Some(label.into()),
            help: Some(help.into()),
            severity: Severity::Error,
            kind,
        }],
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
struct IniParseError {
    context: Option<&'static str>,
    span: Option<SourceSpan>,
    label: Option<&'static str>,
    help: Option<&'static str>,
    kind: Option<IniErrorKind>,
}

impl<I: Stream> ParserError<I> for IniParseError {
    fn from_error_kind(_input: &I, _kind: ErrorKind) -> Self {
        Self {
            span: None,
            label: None,
            help: None,
            context: None,
            kind: None,
        }
    }

    fn append(
        self,
        _input: &I,
        _token_start: &<I as Stream>::Checkpoint,
        _kind: ErrorKind,
    ) -> Self {
        self
    }
}

impl<I: Stream> AddContext<I> for IniParseError {
    fn add_context(
        mut self,
        _input: &I,
        _token_start: &<I as Stream>::Checkpoint,
        ctx: &'static str,
    ) -> Self {
        self.context = self.context.or(Some(ctx));
        self
    }
}

impl<'a> FromExternalError<Input<'a>, ParseIntError> for IniParseError {
    fn from_external_error(_: &Input<'a>, _kind: ErrorKind, e: ParseIntError) -> Self {
        IniParseError {
            span: None,
            label: None,
            help: None,
            context: None,
            kind: Some(IniErrorKind::ParseIntError(e)),
        }
    }
}

impl<'a> FromExternalError<Input<'a>, ParseFloatError> for IniParseError {
    fn from_external_error(_input: &Input<'a>, _kind: ErrorKind, e: ParseFloatError) -> Self {
        IniParseError {
            span: None,
            label: None,
            help: None,
            context: None,
            kind: Some(IniErrorKind::ParseFloatError(e)),
        }
    }
}

fn lbl(label: &'static str) -> &'static str {
    label
}

#[cfg(test)]
fn new_input(s: &str) -> Input<'_> {
    Stateful {
        input: Located::new(s),
        state: ParseState {
            depth: 0,
            max_depth: DEFAULT_NESTING_LIMIT,
        },
    }
}

/// One classified logical line. Items already carry their evaluated value;
/// comment attachment happens in [`build`].
#[derive(Debug, Clone, PartialEq)]
enum Event {
    Header {
        name: String,
        depth: usize,
        span: SourceSpan,
    },
    Item {
        name: String,
        value: IniValue,
        span: SourceSpan,
    },
    Comment(String),
    Blank,
}

/// Folds the classified line stream into the container tree, maintaining a
/// stack of open sections indexed by depth (`stack[0]` is the root).
fn build(events: Vec<Event>, input: &str) -> Result<IniContainer, IniParseFailure> {
    let mut stack = vec![IniContainer::default()];
    let mut pending: Vec<String> = Vec::new();
    for event in events {
        match event {
            Event::Comment(line) => pending.push(line),
            Event::Blank => pending.clear(),
            Event::Header { name, depth, span } => {
                if depth > stack.len() {
                    return Err(structural_failure(
                        input,
                        span,
                        IniErrorKind::SectionDepthJump,
                        "no open section one level above",
                        "a subsection header may only open one level below the innermost open section",
                    ));
                }
                while stack.len() > depth {
                    close_top(&mut stack);
                }
                let mut section = IniContainer::new(name);
                section.depth = depth;
                section.comment = take_comment(&mut pending);
                stack.push(section);
            }
            Event::Item { name, value, span } => {
                if stack.len() == 1 {
                    return Err(structural_failure(
                        input,
                        span,
                        IniErrorKind::ItemOutsideSection,
                        "item defined here",
                        "every item must appear below a [section] header",
                    ));
                }
                let mut item = IniItem::new(name, value);
                item.comment = take_comment(&mut pending);
                if let Some(open) = stack.last_mut() {
                    open.set_item(item);
                }
            }
        }
    }
    while stack.len() > 1 {
        close_top(&mut stack);
    }
    Ok(stack.pop().unwrap_or_default())
}

/// Pops the innermost open section and attaches it to its parent,
/// overwriting (in place) any previous same-named sibling.
fn close_top(stack: &mut Vec<IniContainer>) {
    if let Some(closed) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.set_section(closed);
        }
    }
}

fn take_comment(pending: &mut Vec<String>) -> Option<String> {
    if pending.is_empty() {
        None
    } else {
        Some(std::mem::take(pending).join("\n"))
    }
}

/// `document := line* eof`
fn events(input: &mut Input<'_>) -> PResult<Vec<Event>> {
    repeat_till(0.., event, eof)
        .map(|(events, _): (Vec<Event>, _)| events)
        .parse_next(input)
}

/// `line := comment | header | item | blank`
fn event(input: &mut Input<'_>) -> PResult<Event> {
    alt((comment_line, header_line, item_line, blank_line, bad_line)).parse_next(input)
}

/// `comment := ws ('#' | ';') ' '? text line-end`
fn comment_line(input: &mut Input<'_>) -> PResult<Event> {
    let (_, _, _, text, _) = (ws, one_of(['#', ';']), opt(' '), till_eol, line_end).parse_next(input)?;
    Ok(Event::Comment(text.to_string()))
}

/// `header := ws '['+ name ']'+ ws line-end` — depth is the bracket count,
/// and the opening and closing counts must agree.
fn header_line(input: &mut Input<'_>) -> PResult<Event> {
    let ((opening, (name, closing)), span) = preceded(
        ws,
        (
            take_while(1.., '['),
            cut_err((take_while(1.., section_name_char), take_while(1.., ']')))
                .context(lbl("section header")),
        ),
    )
    .with_span()
    .parse_next(input)?;
    cut_err((ws, line_end))
        .context(lbl("end of section header"))
        .parse_next(input)?;
    if opening.len() != closing.len() {
        return Err(ErrMode::Cut(IniParseError {
            context: None,
            span: Some(span.into()),
            label: Some("opening and closing bracket counts differ"),
            help: Some("write [section], [[subsection]], [[[subsubsection]]], …"),
            kind: Some(IniErrorKind::MismatchedSectionBrackets),
        }));
    }
    Ok(Event::Header {
        name: name.to_string(),
        depth: opening.len(),
        span: span.into(),
    })
}

fn section_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// `item := ws identifier ws '=' ws expr ws line-end` — the expression may
/// span physical lines while bracket nesting is open, because [`sp`] inside
/// composite literals accepts newlines.
fn item_line(input: &mut Input<'_>) -> PResult<Event> {
    let (name, _, _) = preceded(ws, (identifier, ws, '=')).parse_next(input)?;
    let (value, span) = cut_err(preceded(ws, expr))
        .context(lbl("a literal value"))
        .with_span()
        .parse_next(input)?;
    cut_err((ws, line_end))
        .context(lbl("end of item definition"))
        .parse_next(input)?;
    Ok(Event::Item {
        name: name.to_string(),
        value,
        span: span.into(),
    })
}

/// `identifier := (word-char - digit) word-char*`
fn identifier<'s>(input: &mut Input<'s>) -> PResult<&'s str> {
    (
        one_of(|c: char| is_word_char(c) && !c.is_numeric()),
        take_while(0.., is_word_char),
    )
        .take()
        .parse_next(input)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `blank := ws line-end` — also breaks comment-to-entity adjacency.
fn blank_line(input: &mut Input<'_>) -> PResult<Event> {
    (ws, alt((newline, eof.void())))
        .value(Event::Blank)
        .parse_next(input)
}

/// Anything the other line parsers reject. Always errors, with the whole
/// physical line as the span.
fn bad_line(input: &mut Input<'_>) -> PResult<Event> {
    let (_, span) = till_eol.with_span().parse_next(input)?;
    Err(ErrMode::Cut(IniParseError {
        context: None,
        span: Some(span.into()),
        label: Some("unrecognized line"),
        help: Some("expected a [section] header, an `identifier = value` definition, or a #/; comment"),
        kind: Some(IniErrorKind::UnrecognizedLine),
    }))
}

/// `ws := (' ' | '\t')*` — horizontal space within one physical line.
fn ws(input: &mut Input<'_>) -> PResult<()> {
    take_while(0.., [' ', '\t']).void().parse_next(input)
}

/// `sp := (' ' | '\t' | newline)*` — insignificant space inside brackets.
fn sp(input: &mut Input<'_>) -> PResult<()> {
    take_while(0.., [' ', '\t', '\r', '\n'])
        .void()
        .parse_next(input)
}

/// `newline := '\r\n' | '\n' | '\r'`
fn newline(input: &mut Input<'_>) -> PResult<()> {
    alt(("\r\n", "\n", "\r")).void().parse_next(input)
}

/// `line-end := newline | eof`
fn line_end(input: &mut Input<'_>) -> PResult<()> {
    alt((newline, eof.void())).parse_next(input)
}

fn till_eol<'s>(input: &mut Input<'s>) -> PResult<&'s str> {
    take_till(0.., ['\r', '\n']).parse_next(input)
}

/// `expr := list | tuple | dict-or-set | 'set()' | scalar`
///
/// The whole restricted literal grammar. A failure that is not already more
/// specific is tagged [`IniErrorKind::InvalidLiteral`]: nothing
/// expression-shaped (names, calls, arithmetic) parses.
fn expr(input: &mut Input<'_>) -> PResult<IniValue> {
    match alt((list, tuple, braced, empty_set, scalar)).parse_next(input) {
        Err(ErrMode::Backtrack(mut e)) => {
            // A backtrack here means no literal form matched. Context picked
            // up from the failed alternatives (e.g. "float") describes one
            // wrong guess, not the problem, so it is discarded.
            if e.kind.is_none() {
                e.kind = Some(IniErrorKind::InvalidLiteral);
                e.context = None;
                e.label = Some("not a literal");
                e.help = Some(
                    "values must be literals: strings, bytes, numbers, True/False, None, \
                     or nested lists, tuples, dicts, and sets",
                );
            }
            Err(ErrMode::Backtrack(e))
        }
        other => other,
    }
}

/// `scalar := bytes | string | keyword | number`
fn scalar(input: &mut Input<'_>) -> PResult<IniValue> {
    alt((
        bytes_literal,
        string.map(IniValue::String),
        keyword,
        number,
    ))
    .parse_next(input)
}

/// `keyword := 'True' | 'False' | 'None'`
fn keyword(input: &mut Input<'_>) -> PResult<IniValue> {
    alt((
        "True".value(IniValue::Bool(true)),
        "False".value(IniValue::Bool(false)),
        "None".value(IniValue::None),
    ))
    .parse_next(input)
}

/// Bumps the literal nesting depth, erroring out once the configured limit
/// is crossed.
fn enter_nested(input: &mut Input<'_>) -> PResult<()> {
    input.state.depth += 1;
    if input.state.depth > input.state.max_depth {
        Err(ErrMode::Cut(IniParseError {
            context: None,
            span: None,
            label: Some("nested too deeply"),
            help: Some("flatten the value or parse with a higher depth limit"),
            kind: Some(IniErrorKind::LiteralNestingTooDeep),
        }))
    } else {
        Ok(())
    }
}

fn exit_nested(input: &mut Input<'_>) {
    input.state.depth = input.state.depth.saturating_sub(1);
}

/// `list := '[' elements ']'`
fn list(input: &mut Input<'_>) -> PResult<IniValue> {
    '['.parse_next(input)?;
    enter_nested(input)?;
    let items = cut_err(terminated(elements, (sp, ']')))
        .context(lbl("closing ']'"))
        .parse_next(input)?;
    exit_nested(input);
    Ok(IniValue::List(items))
}

/// `elements := (expr (sp ',' sp expr)* (sp ',')?)?`
fn elements(input: &mut Input<'_>) -> PResult<Vec<IniValue>> {
    let items: Vec<IniValue> =
        separated(0.., preceded(sp, expr), (sp, ',')).parse_next(input)?;
    if !items.is_empty() {
        opt((sp, ',')).void().parse_next(input)?;
    }
    Ok(items)
}

/// `tuple := '(' elements ')'` — a single element without a trailing comma
/// is not a tuple, just a parenthesized value.
fn tuple(input: &mut Input<'_>) -> PResult<IniValue> {
    '('.parse_next(input)?;
    enter_nested(input)?;
    let value = cut_err(terminated(tuple_body, (sp, ')')))
        .context(lbl("closing ')'"))
        .parse_next(input)?;
    exit_nested(input);
    Ok(value)
}

fn tuple_body(input: &mut Input<'_>) -> PResult<IniValue> {
    let mut items: Vec<IniValue> =
        separated(0.., preceded(sp, expr), (sp, ',')).parse_next(input)?;
    let trailing = if items.is_empty() {
        false
    } else {
        opt((sp, ',')).parse_next(input)?.is_some()
    };
    if items.len() == 1 && !trailing {
        Ok(items.remove(0))
    } else {
        Ok(IniValue::Tuple(items))
    }
}

/// ```text
/// dict-or-set := '{' sp '}'                        (empty dict)
///              | '{' sp expr sp ':' pairs '}'      (dict)
///              | '{' sp expr members '}'           (set)
/// ```
///
/// Both forms open with `{` and an expression; which one it is only becomes
/// clear at the `:` (or its absence), so they share one parser.
fn braced(input: &mut Input<'_>) -> PResult<IniValue> {
    '{'.parse_next(input)?;
    enter_nested(input)?;
    let value = cut_err(braced_body)
        .context(lbl("closing '}'"))
        .parse_next(input)?;
    exit_nested(input);
    Ok(value)
}

fn braced_body(input: &mut Input<'_>) -> PResult<IniValue> {
    sp.parse_next(input)?;
    if opt('}').parse_next(input)?.is_some() {
        return Ok(IniValue::Dict(Vec::new()));
    }
    let first = expr.parse_next(input)?;
    sp.parse_next(input)?;
    if opt(':').parse_next(input)?.is_some() {
        let value = preceded(sp, expr).parse_next(input)?;
        let mut pairs = Vec::new();
        dict_insert(&mut pairs, first, value);
        while opt(preceded(sp, ',')).parse_next(input)?.is_some() {
            sp.parse_next(input)?;
            if at_closing_brace(input)? {
                break;
            }
            let key = expr.parse_next(input)?;
            (sp, ':', sp).parse_next(input)?;
            let value = expr.parse_next(input)?;
            dict_insert(&mut pairs, key, value);
        }
        (sp, '}').void().parse_next(input)?;
        Ok(IniValue::Dict(pairs))
    } else {
        let mut items = vec![first];
        while opt(preceded(sp, ',')).parse_next(input)?.is_some() {
            sp.parse_next(input)?;
            if at_closing_brace(input)? {
                break;
            }
            let item = expr.parse_next(input)?;
            if !items.contains(&item) {
                items.push(item);
            }
        }
        (sp, '}').void().parse_next(input)?;
        Ok(IniValue::Set(items))
    }
}

fn at_closing_brace(input: &mut Input<'_>) -> PResult<bool> {
    Ok(peek(opt('}')).parse_next(input)?.is_some())
}

/// Duplicate dict keys overwrite in place, keeping first-insertion order.
fn dict_insert(pairs: &mut Vec<(IniValue, IniValue)>, key: IniValue, value: IniValue) {
    if let Some(pair) = pairs.iter_mut().find(|(k, _)| *k == key) {
        pair.1 = value;
    } else {
        pairs.push((key, value));
    }
}

/// `empty-set := 'set' ws '(' ws ')'` — the one non-bracket spelling the
/// evaluator accepts, because `{}` already means an empty dict.
fn empty_set(input: &mut Input<'_>) -> PResult<IniValue> {
    ("set", ws, '(', ws, ')')
        .value(IniValue::Set(Vec::new()))
        .parse_next(input)
}

/// `string := '\'' string-char* '\'' | '"' string-char* '"'`
fn string(input: &mut Input<'_>) -> PResult<String> {
    let quote = one_of(['\'', '"']).parse_next(input)?;
    let body: String = repeat(0.., string_char(quote)).parse_next(input)?;
    cut_err(quote)
        .context(lbl("closing quote"))
        .parse_next(input)?;
    Ok(body)
}

/// `string-char := '\' escape | [^\\'"] - newline`
fn string_char<'s>(quote: char) -> impl Parser<Input<'s>, char, IniParseError> {
    move |input: &mut Input<'s>| {
        alt((escaped_char, none_of(['\\', quote, '\n', '\r']))).parse_next(input)
    }
}

/// ```text
/// escape := ['"\\nrt0bf] | 'x' hex{2} | 'u' hex{4} | 'U' hex{8}
/// ```
fn escaped_char(input: &mut Input<'_>) -> PResult<char> {
    preceded(
        '\\',
        cut_err(alt((
            '\\'.value('\\'),
            '\''.value('\''),
            '"'.value('"'),
            'n'.value('\n'),
            'r'.value('\r'),
            't'.value('\t'),
            '0'.value('\0'),
            'b'.value('\u{0008}'),
            'f'.value('\u{000C}'),
            unicode_escape,
        )))
        .context(lbl("escape sequence")),
    )
    .parse_next(input)
}

fn unicode_escape(input: &mut Input<'_>) -> PResult<char> {
    alt((
        preceded('x', take_while(2..=2, AsChar::is_hex_digit)),
        preceded('u', take_while(4..=4, AsChar::is_hex_digit)),
        preceded('U', take_while(8..=8, AsChar::is_hex_digit)),
    ))
    .verify_map(|hx: &str| u32::from_str_radix(hx, 16).ok().and_then(char::from_u32))
    .parse_next(input)
}

/// `bytes := ('b' | 'B') quoted-ascii` — byte-strings hold ASCII directly
/// and everything else through `\xHH`.
fn bytes_literal(input: &mut Input<'_>) -> PResult<IniValue> {
    one_of(['b', 'B']).parse_next(input)?;
    let quote = one_of(['\'', '"']).parse_next(input)?;
    let body: Vec<u8> = repeat(0.., byte_char(quote)).parse_next(input)?;
    cut_err(quote)
        .context(lbl("closing quote"))
        .parse_next(input)?;
    Ok(IniValue::Bytes(body))
}

fn byte_char<'s>(quote: char) -> impl Parser<Input<'s>, u8, IniParseError> {
    move |input: &mut Input<'s>| {
        alt((
            preceded('\\', cut_err(byte_escape)).context(lbl("byte escape sequence")),
            none_of(['\\', quote, '\n', '\r'])
                .verify(|c: &char| c.is_ascii())
                .map(|c| c as u8),
        ))
        .parse_next(input)
    }
}

fn byte_escape(input: &mut Input<'_>) -> PResult<u8> {
    alt((
        preceded('x', take_while(2..=2, AsChar::is_hex_digit))
            .try_map(|hx: &str| u8::from_str_radix(hx, 16)),
        '\\'.value(b'\\'),
        '\''.value(b'\''),
        '"'.value(b'"'),
        'n'.value(b'\n'),
        'r'.value(b'\r'),
        't'.value(b'\t'),
        '0'.value(b'\0'),
    ))
    .parse_next(input)
}

/// `number := hex | octal | binary | float | decimal`
fn number(input: &mut Input<'_>) -> PResult<IniValue> {
    alt((hex, octal, binary, float_value, decimal_value)).parse_next(input)
}

/// ```text
/// float := sign? (integer '.' integer? | '.' integer) exponent?
///        | sign? integer exponent
/// exponent := ('e' | 'E') sign? integer
/// ```
fn float_value(input: &mut Input<'_>) -> PResult<IniValue> {
    alt((
        (signum, udigits, '.', opt(udigits), opt(exponent)).take(),
        (signum, '.', udigits, opt(exponent)).take(),
        (signum, udigits, exponent).take(),
    ))
    .try_map(|s: &str| s.replace('_', "").parse::<f64>().map(IniValue::Float))
    .context(lbl("float"))
    .parse_next(input)
}

fn exponent<'s>(input: &mut Input<'s>) -> PResult<&'s str> {
    (one_of(['e', 'E']), signum, udigits)
        .take()
        .parse_next(input)
}

/// `decimal := sign? digit (digit | '_')*`
///
/// The sign stays part of the text handed to `parse`, so `i64::MIN` (whose
/// magnitude does not fit in a positive `i64`) parses.
fn decimal_value(input: &mut Input<'_>) -> PResult<IniValue> {
    (signum, udigits)
        .take()
        .try_map(|s: &str| s.replace('_', "").parse::<i64>().map(IniValue::Integer))
        .parse_next(input)
}

fn udigits<'s>(input: &mut Input<'s>) -> PResult<&'s str> {
    (digit1, take_while(0.., ('_', '0'..='9')))
        .take()
        .parse_next(input)
}

/// `hex := sign? '0x' hex-digit (hex-digit | '_')*`
fn hex(input: &mut Input<'_>) -> PResult<IniValue> {
    let negative = terminated(signum, alt(("0x", "0X"))).parse_next(input)?;
    cut_err((
        hex_digit1,
        repeat(0.., alt(("_", take_while(1.., AsChar::is_hex_digit).take()))),
    ))
    .try_map(move |(l, r): (&str, Vec<&str>)| {
        let sign = if negative { "-" } else { "" };
        i64::from_str_radix(
            &format!("{sign}{l}{}", str::replace(&r.join(""), "_", "")),
            16,
        )
        .map(IniValue::Integer)
    })
    .context(lbl("hexadecimal"))
    .parse_next(input)
}

/// `octal := sign? '0o' [0-7] [0-7_]*`
fn octal(input: &mut Input<'_>) -> PResult<IniValue> {
    let negative = terminated(signum, alt(("0o", "0O"))).parse_next(input)?;
    cut_err((
        oct_digit1,
        repeat(0.., alt(("_", take_while(1.., AsChar::is_oct_digit).take()))),
    ))
    .try_map(move |(l, r): (&str, Vec<&str>)| {
        let sign = if negative { "-" } else { "" };
        i64::from_str_radix(&format!("{sign}{l}{}", str::replace(&r.join(""), "_", "")), 8)
            .map(IniValue::Integer)
    })
    .context(lbl("octal"))
    .parse_next(input)
}

/// `binary := sign? '0b' ('0' | '1') ('0' | '1' | '_')*`
fn binary(input: &mut Input<'_>) -> PResult<IniValue> {
    let negative = terminated(signum, alt(("0b", "0B"))).parse_next(input)?;
    cut_err((alt(("0", "1")), repeat(0.., alt(("0", "1", "_")))))
        .try_map(move |(x, xs): (&str, Vec<&str>)| {
            let sign = if negative { "-" } else { "" };
            i64::from_str_radix(&format!("{sign}{x}{}", str::replace(&xs.join(""), "_", "")), 2)
                .map(IniValue::Integer)
        })
        .context(lbl("binary"))
        .parse_next(input)
}

/// Consumes an optional sign, returning whether it was `-`.
fn signum(input: &mut Input<'_>) -> PResult<bool> {
    let sign = opt(one_of(['+', '-'])).parse_next(input)?;
    Ok(sign == Some('-'))
}

#[cfg(test)]
mod string_tests {
    use super::*;

    #[test]
    fn quoted_string() {
        assert_eq!(
            string.parse(new_input("'foo'")).unwrap(),
            String::from("foo")
        );
        assert_eq!(
            string.parse(new_input("\"it's\"")).unwrap(),
            String::from("it's")
        );
        assert_eq!(
            string.parse(new_input(r"'a\tb\n\'c\''")).unwrap(),
            String::from("a\tb\n'c'")
        );
        assert_eq!(
            string.parse(new_input(r"'\x41é'")).unwrap(),
            String::from("Aé")
        );
        assert!(string.parse(new_input("'unterminated")).is_err());
        assert!(string.parse(new_input("'bad\\qescape'")).is_err());
        assert!(string.parse(new_input("'no\nnewlines'")).is_err());
    }

    #[test]
    fn bytes() {
        assert_eq!(
            bytes_literal.parse(new_input(r"b'a\x00\xff'")).unwrap(),
            IniValue::Bytes(vec![b'a', 0x00, 0xff])
        );
        // Non-ASCII has to use \xHH.
        assert!(bytes_literal.parse(new_input("b'é'")).is_err());
    }
}
