// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The SVG path mini-language.
//!
//! Parsing drives a [`PathBuilder`], so smooth curves and arcs reuse the
//! builder's cursor state. A syntax error stops parsing, but every command
//! completed before it has already been emitted.

use alloc::string::String;
use core::fmt::{self, Write};

use arrayvec::ArrayVec;

use crate::{BezPath, PathBuilder, PathEl, PathSink, Point, Vec2};

impl BezPath {
    /// Parse an SVG path string.
    ///
    /// ```
    /// use vecpath::BezPath;
    ///
    /// let path = BezPath::from_svg("M10 10h80v80h-80z").unwrap();
    /// assert_eq!(path.segments().count(), 4);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns the first syntax error. Use [`BezPath::from_svg_lossy`] to
    /// keep the commands parsed before it.
    pub fn from_svg(data: &str) -> Result<BezPath, SvgParseError> {
        match BezPath::from_svg_lossy(data) {
            (path, None) => Ok(path),
            (_, Some(err)) => Err(err),
        }
    }

    /// Parse an SVG path string, keeping the partial path on error.
    ///
    /// ```
    /// use vecpath::svg::SvgParseErrorKind;
    /// use vecpath::BezPath;
    ///
    /// let (path, err) = BezPath::from_svg_lossy("M0 0L10 0L10 x");
    /// assert_eq!(path.elements().len(), 2);
    /// let err = err.unwrap();
    /// assert_eq!(err.kind, SvgParseErrorKind::Wrong);
    /// assert_eq!(err.offset, 13);
    /// ```
    pub fn from_svg_lossy(data: &str) -> (BezPath, Option<SvgParseError>) {
        let mut builder = PathBuilder::new(BezPath::new());
        let result = parse_svg_into(data, &mut builder);
        (builder.finish(), result.err())
    }

    /// Convert the path to an SVG path string.
    ///
    /// A command letter is omitted when it repeats the previous one, except
    /// for `M`, where repeated coordinates would mean `L`.
    ///
    /// ```
    /// use vecpath::BezPath;
    ///
    /// let mut path = BezPath::new();
    /// path.move_to((0.0, 0.0));
    /// path.line_to((10.0, 0.0));
    /// path.line_to((10.0, 10.0));
    /// path.close_path();
    /// assert_eq!(path.to_svg(), "M0 0L10 0 10 10Z");
    /// ```
    pub fn to_svg(&self) -> String {
        let mut result = String::new();
        // Writing into a `String` cannot fail.
        let _ = self.write_svg(&mut result);
        result
    }

    /// Write the SVG path string for this path.
    ///
    /// # Errors
    ///
    /// Propagates errors from the writer.
    pub fn write_svg<W: Write>(&self, w: &mut W) -> fmt::Result {
        let mut last = None;
        for el in self.elements() {
            let mut points: ArrayVec<Point, 3> = ArrayVec::new();
            let letter = match *el {
                PathEl::MoveTo(p) => {
                    points.push(p);
                    'M'
                }
                PathEl::LineTo(p) => {
                    points.push(p);
                    'L'
                }
                PathEl::QuadTo(p1, p2) => {
                    points.extend([p1, p2]);
                    'Q'
                }
                PathEl::CurveTo(p1, p2, p3) => {
                    points.extend([p1, p2, p3]);
                    'C'
                }
                PathEl::ClosePath => 'Z',
            };
            let implicit = last == Some(letter) && matches!(letter, 'L' | 'Q' | 'C');
            if implicit {
                w.write_char(' ')?;
            } else {
                w.write_char(letter)?;
            }
            for (i, p) in points.iter().enumerate() {
                if i > 0 {
                    w.write_char(' ')?;
                }
                write!(w, "{} {}", clean(p.x), clean(p.y))?;
            }
            last = Some(letter);
        }
        Ok(())
    }
}

/// Avoid printing `-0`.
fn clean(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x
    }
}

/// Parse an SVG path string into a builder.
///
/// Commands are emitted as they complete. On error, everything before the
/// offending command has been emitted and the builder's session is left
/// open for the caller to finish.
///
/// ```
/// use vecpath::svg::parse_svg_into;
/// use vecpath::{BezPath, PathBuilder, Point};
///
/// let mut builder = PathBuilder::new(BezPath::new());
/// parse_svg_into("M0 0 10 0 10 10", &mut builder).unwrap();
/// assert_eq!(builder.last_point(), Some(Point::new(10.0, 10.0)));
/// ```
///
/// # Errors
///
/// Returns the first syntax error, with the byte offset at which it was
/// found.
pub fn parse_svg_into<S: PathSink>(
    data: &str,
    builder: &mut PathBuilder<S>,
) -> Result<(), SvgParseError> {
    let result = parse_commands(data, builder);
    if let Err(err) = &result {
        tracing::debug!(offset = err.offset, kind = ?err.kind, "svg path parse stopped");
    }
    result
}

fn parse_commands<S: PathSink>(
    data: &str,
    builder: &mut PathBuilder<S>,
) -> Result<(), SvgParseError> {
    let mut lexer = SvgLexer::new(data);
    let mut last_cmd = None;
    while let Some(cmd) = lexer.get_cmd(last_cmd)? {
        let relative = cmd.is_ascii_lowercase();
        let upper = cmd.to_ascii_uppercase();
        let current = builder.last_point();
        if current.is_none() && upper != b'M' {
            return Err(lexer.error_at(lexer.cmd_start, SvgParseErrorKind::MissingMoveTo));
        }
        let origin = current.unwrap_or(Point::ZERO);
        let base = if relative { origin.to_vec2() } else { Vec2::ZERO };
        match upper {
            b'M' => {
                let p = lexer.get_point()? + base;
                builder.move_to(p);
                // Pairs after a move are implicit lines.
                last_cmd = Some(if relative { b'l' } else { b'L' });
                continue;
            }
            b'L' => {
                let p = lexer.get_point()? + base;
                builder.line_to(p);
            }
            b'H' => {
                let x = lexer.get_number()? + base.x;
                builder.line_to(Point::new(x, origin.y));
            }
            b'V' => {
                let y = lexer.get_number()? + base.y;
                builder.line_to(Point::new(origin.x, y));
            }
            b'Q' => {
                let p1 = lexer.get_point()? + base;
                let p2 = lexer.get_point()? + base;
                builder.quad_to(p1, p2);
            }
            b'T' => {
                let p2 = lexer.get_point()? + base;
                builder.smooth_quad_to(p2);
            }
            b'C' => {
                let p1 = lexer.get_point()? + base;
                let p2 = lexer.get_point()? + base;
                let p3 = lexer.get_point()? + base;
                builder.curve_to(p1, p2, p3);
            }
            b'S' => {
                let p2 = lexer.get_point()? + base;
                let p3 = lexer.get_point()? + base;
                builder.smooth_curve_to(p2, p3);
            }
            b'A' => {
                let rx = lexer.get_number()?;
                let ry = lexer.get_number()?;
                let x_rotation = lexer.get_number()?;
                let large_arc = lexer.get_flag()?;
                let sweep = lexer.get_flag()?;
                let p = lexer.get_point()? + base;
                builder.arc_to(rx, ry, x_rotation, large_arc, sweep, p);
            }
            b'Z' => {
                builder.close_path();
                // No implicit repetition after a close.
                last_cmd = None;
                continue;
            }
            _ => {
                return Err(lexer.error_at(
                    lexer.cmd_start,
                    SvgParseErrorKind::UnknownCommand(char::from(cmd)),
                ));
            }
        }
        last_cmd = Some(cmd);
    }
    Ok(())
}

/// An error which can be returned when parsing an SVG path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SvgParseError {
    /// What went wrong.
    pub kind: SvgParseErrorKind,
    /// Byte offset of the offending token.
    pub offset: usize,
}

/// The kinds of [`SvgParseError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum SvgParseErrorKind {
    /// A number or flag was expected.
    Wrong,
    /// The input ended while still expecting arguments.
    UnexpectedEof,
    /// Encountered an unknown command letter.
    UnknownCommand(char),
    /// A drawing command came before the first move.
    MissingMoveTo,
}

impl fmt::Display for SvgParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SvgParseErrorKind::Wrong => write!(f, "Unable to parse a number")?,
            SvgParseErrorKind::UnexpectedEof => write!(f, "Unexpected EOF")?,
            SvgParseErrorKind::UnknownCommand(letter) => {
                write!(f, "Unknown command, \"{letter}\"")?;
            }
            SvgParseErrorKind::MissingMoveTo => write!(f, "Path must begin with a move")?,
        }
        write!(f, " at offset {}", self.offset)
    }
}

impl core::error::Error for SvgParseError {}

struct SvgLexer<'a> {
    data: &'a str,
    ix: usize,
    /// Where the command being parsed started.
    cmd_start: usize,
}

impl SvgLexer<'_> {
    fn new(data: &str) -> SvgLexer<'_> {
        SvgLexer {
            data,
            ix: 0,
            cmd_start: 0,
        }
    }

    fn error_at(&self, offset: usize, kind: SvgParseErrorKind) -> SvgParseError {
        SvgParseError { kind, offset }
    }

    fn skip_ws(&mut self) {
        while let Some(&c) = self.data.as_bytes().get(self.ix) {
            if !matches!(c, b' ' | b'\t' | b'\n' | b'\x0c' | b'\r') {
                break;
            }
            self.ix += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.data.as_bytes().get(self.ix).copied()
    }

    /// The next command letter, or the previous one repeated if numbers
    /// follow. `None` at the end of input.
    fn get_cmd(&mut self, last_cmd: Option<u8>) -> Result<Option<u8>, SvgParseError> {
        self.skip_ws();
        self.cmd_start = self.ix;
        let Some(c) = self.peek() else {
            return Ok(None);
        };
        if c.is_ascii_alphabetic() {
            self.ix += 1;
            return Ok(Some(c));
        }
        match last_cmd {
            Some(cmd) if matches!(c, b'+' | b'-' | b'.' | b',') || c.is_ascii_digit() => {
                Ok(Some(cmd))
            }
            _ => Err(self.error_at(self.ix, SvgParseErrorKind::Wrong)),
        }
    }

    /// Skip whitespace and at most one comma before an argument.
    fn skip_separator(&mut self) {
        self.skip_ws();
        if self.peek() == Some(b',') {
            self.ix += 1;
            self.skip_ws();
        }
    }

    fn get_number(&mut self) -> Result<f64, SvgParseError> {
        self.skip_separator();
        let start = self.ix;
        let bytes = self.data.as_bytes();
        let digits = |ix: &mut usize| {
            let begin = *ix;
            while bytes.get(*ix).is_some_and(u8::is_ascii_digit) {
                *ix += 1;
            }
            *ix - begin
        };
        let mut ix = start;
        if matches!(bytes.get(ix), Some(b'+' | b'-')) {
            ix += 1;
        }
        let mut digit_count = digits(&mut ix);
        if bytes.get(ix) == Some(&b'.') {
            ix += 1;
            digit_count += digits(&mut ix);
        }
        if digit_count == 0 {
            let kind = if ix >= bytes.len() {
                SvgParseErrorKind::UnexpectedEof
            } else {
                SvgParseErrorKind::Wrong
            };
            return Err(self.error_at(start, kind));
        }
        if matches!(bytes.get(ix), Some(b'e' | b'E')) {
            let mut exp = ix + 1;
            if matches!(bytes.get(exp), Some(b'+' | b'-')) {
                exp += 1;
            }
            // An `e` without digits belongs to whatever follows.
            if digits(&mut exp) > 0 {
                ix = exp;
            }
        }
        let value = self.data[start..ix]
            .parse()
            .map_err(|_| self.error_at(start, SvgParseErrorKind::Wrong))?;
        self.ix = ix;
        Ok(value)
    }

    fn get_point(&mut self) -> Result<Point, SvgParseError> {
        let x = self.get_number()?;
        let y = self.get_number()?;
        Ok(Point::new(x, y))
    }

    /// Arc flags are a single digit, so `a1 1 0 011 1` is valid.
    fn get_flag(&mut self) -> Result<bool, SvgParseError> {
        self.skip_separator();
        match self.peek() {
            Some(b'0') => {
                self.ix += 1;
                Ok(false)
            }
            Some(b'1') => {
                self.ix += 1;
                Ok(true)
            }
            Some(_) => Err(self.error_at(self.ix, SvgParseErrorKind::Wrong)),
            None => Err(self.error_at(self.ix, SvgParseErrorKind::UnexpectedEof)),
        }
    }
}
