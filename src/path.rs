//! SVG path data parsing into absolute drawing segments.
//!
//! SVG path syntax: https://www.w3.org/TR/SVG/paths.html
//!
//! Relative coordinates, `H`/`V` shorthands, smooth-curve reflections and
//! `Z` are all resolved here, so every [`Segment`] carries absolute points.

use crate::error::LayercutError;
use crate::geometry::Point;

/// One drawing step of a path, in absolute user-space coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    /// Start of a subpath. Draws nothing but still counts for the bounds.
    MoveTo(Point),
    Line {
        from: Point,
        to: Point,
    },
    Quad {
        from: Point,
        ctrl: Point,
        to: Point,
    },
    Cubic {
        from: Point,
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
    },
    Arc {
        from: Point,
        rx: f64,
        ry: f64,
        x_axis_rotation: f64,
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
}

/// Parse SVG path data.
pub fn parse_path(d: &str) -> Result<Vec<Segment>, LayercutError> {
    PathParser::new(d).parse()
}

struct PathParser<'a> {
    input: &'a str,
    pos: usize,
    current: Point,
    subpath_start: Point,
    /// Second control point of the previous C/S, for S reflection
    last_cubic_ctrl: Option<Point>,
    /// Control point of the previous Q/T, for T reflection
    last_quad_ctrl: Option<Point>,
    segments: Vec<Segment>,
}

impl<'a> PathParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            current: Point::ORIGIN,
            subpath_start: Point::ORIGIN,
            last_cubic_ctrl: None,
            last_quad_ctrl: None,
            segments: Vec::new(),
        }
    }

    fn parse(mut self) -> Result<Vec<Segment>, LayercutError> {
        let mut prev_cmd: Option<char> = None;

        loop {
            self.skip_whitespace_and_comma();
            let Some(c) = self.peek() else { break };

            let cmd = if c.is_ascii_alphabetic() {
                self.next();
                c
            } else {
                // Implicit repetition of the previous command
                match prev_cmd {
                    Some('M') => 'L',
                    Some('m') => 'l',
                    Some('Z' | 'z') | None => {
                        return Err(self.error(format!("unexpected '{}'", c)));
                    }
                    Some(prev) => prev,
                }
            };

            if prev_cmd.is_none() && !matches!(cmd, 'M' | 'm') {
                return Err(self.error("path must start with a moveto".into()));
            }

            self.command(cmd)?;
            prev_cmd = Some(cmd);
        }

        Ok(self.segments)
    }

    fn command(&mut self, cmd: char) -> Result<(), LayercutError> {
        let rel = cmd.is_ascii_lowercase();
        let from = self.current;
        let mut cubic_ctrl = None;
        let mut quad_ctrl = None;

        let segment = match cmd.to_ascii_uppercase() {
            'M' => {
                let to = self.point(rel)?;
                self.subpath_start = to;
                Segment::MoveTo(to)
            }
            'L' => Segment::Line {
                from,
                to: self.point(rel)?,
            },
            'H' => {
                let x = self.number()?;
                let x = if rel { from.x + x } else { x };
                Segment::Line {
                    from,
                    to: Point::new(x, from.y),
                }
            }
            'V' => {
                let y = self.number()?;
                let y = if rel { from.y + y } else { y };
                Segment::Line {
                    from,
                    to: Point::new(from.x, y),
                }
            }
            'C' => {
                let ctrl1 = self.point(rel)?;
                let ctrl2 = self.point(rel)?;
                let to = self.point(rel)?;
                cubic_ctrl = Some(ctrl2);
                Segment::Cubic {
                    from,
                    ctrl1,
                    ctrl2,
                    to,
                }
            }
            'S' => {
                let ctrl1 = self.last_cubic_ctrl.map_or(from, |c| c.reflect_about(from));
                let ctrl2 = self.point(rel)?;
                let to = self.point(rel)?;
                cubic_ctrl = Some(ctrl2);
                Segment::Cubic {
                    from,
                    ctrl1,
                    ctrl2,
                    to,
                }
            }
            'Q' => {
                let ctrl = self.point(rel)?;
                let to = self.point(rel)?;
                quad_ctrl = Some(ctrl);
                Segment::Quad { from, ctrl, to }
            }
            'T' => {
                let ctrl = self.last_quad_ctrl.map_or(from, |c| c.reflect_about(from));
                let to = self.point(rel)?;
                quad_ctrl = Some(ctrl);
                Segment::Quad { from, ctrl, to }
            }
            'A' => {
                let rx = self.number()?;
                let ry = self.number()?;
                let x_axis_rotation = self.number()?;
                let large_arc = self.flag()?;
                let sweep = self.flag()?;
                let to = self.point(rel)?;
                Segment::Arc {
                    from,
                    rx,
                    ry,
                    x_axis_rotation,
                    large_arc,
                    sweep,
                    to,
                }
            }
            'Z' => Segment::Line {
                from,
                to: self.subpath_start,
            },
            _ => return Err(self.error(format!("unknown command '{}'", cmd))),
        };

        self.current = segment.end();
        self.last_cubic_ctrl = cubic_ctrl;
        self.last_quad_ctrl = quad_ctrl;
        self.segments.push(segment);
        Ok(())
    }

    fn point(&mut self, rel: bool) -> Result<Point, LayercutError> {
        let x = self.number()?;
        let y = self.number()?;
        Ok(if rel {
            Point::new(self.current.x + x, self.current.y + y)
        } else {
            Point::new(x, y)
        })
    }

    fn number(&mut self) -> Result<f64, LayercutError> {
        self.skip_whitespace_and_comma();
        let start = self.pos;

        if matches!(self.peek(), Some('+' | '-')) {
            self.next();
        }
        let int_digits = self.skip_digits();
        let mut frac_digits = 0;
        if self.peek() == Some('.') {
            self.next();
            frac_digits = self.skip_digits();
        }
        if int_digits == 0 && frac_digits == 0 {
            self.pos = start;
            return Err(self.error("expected number".into()));
        }

        // Exponent only when digits follow, so "1e" stays a parse error upstream
        if matches!(self.peek(), Some('e' | 'E')) {
            let mark = self.pos;
            self.next();
            if matches!(self.peek(), Some('+' | '-')) {
                self.next();
            }
            if self.skip_digits() == 0 {
                self.pos = mark;
            }
        }

        self.input[start..self.pos]
            .parse()
            .map_err(|_| self.error(format!("invalid number '{}'", &self.input[start..self.pos])))
    }

    fn flag(&mut self) -> Result<bool, LayercutError> {
        self.skip_whitespace_and_comma();
        match self.next() {
            Some('0') => Ok(false),
            Some('1') => Ok(true),
            _ => Err(self.error("expected arc flag".into())),
        }
    }

    fn skip_digits(&mut self) -> usize {
        let mut count = 0;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.next();
            count += 1;
        }
        count
    }

    fn skip_whitespace_and_comma(&mut self) {
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_whitespace() || c == ',')
        {
            self.next();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, msg: String) -> LayercutError {
        LayercutError::InvalidPath(format!("{} at offset {}", msg, self.pos))
    }
}

impl Segment {
    /// Point where the pen rests after this segment.
    pub fn end(&self) -> Point {
        match *self {
            Segment::MoveTo(p) => p,
            Segment::Line { to, .. }
            | Segment::Quad { to, .. }
            | Segment::Cubic { to, .. }
            | Segment::Arc { to, .. } => to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_parse_simple_path() {
        let segs = parse_path("M 10 20 L 30 40 Z").unwrap();
        assert_eq!(
            segs,
            [
                Segment::MoveTo(p(10.0, 20.0)),
                Segment::Line {
                    from: p(10.0, 20.0),
                    to: p(30.0, 40.0)
                },
                Segment::Line {
                    from: p(30.0, 40.0),
                    to: p(10.0, 20.0)
                },
            ]
        );
    }

    #[test]
    fn test_relative_and_shorthand() {
        let segs = parse_path("m10 10h5v-3l-1-1").unwrap();
        let ends: Vec<_> = segs.iter().map(Segment::end).collect();
        assert_eq!(ends, [p(10.0, 10.0), p(15.0, 10.0), p(15.0, 7.0), p(14.0, 6.0)]);
    }

    #[test]
    fn test_implicit_lineto_after_moveto() {
        let segs = parse_path("m 1 1 2 2 3 3").unwrap();
        assert_eq!(segs.len(), 3);
        assert!(matches!(segs[1], Segment::Line { .. }));
        assert_eq!(segs[2].end(), p(6.0, 6.0));
    }

    #[test]
    fn test_compact_numbers() {
        let segs = parse_path("M.5.5L-1e1-2.5E-1").unwrap();
        assert_eq!(segs[0].end(), p(0.5, 0.5));
        assert_eq!(segs[1].end(), p(-10.0, -0.25));
    }

    #[test]
    fn test_smooth_cubic_reflection() {
        let segs = parse_path("M0 0 C0 10 10 10 10 0 S20 -10 20 0").unwrap();
        match segs[2] {
            Segment::Cubic { ctrl1, .. } => assert_eq!(ctrl1, p(10.0, -10.0)),
            other => panic!("expected cubic, got {:?}", other),
        }
    }

    #[test]
    fn test_smooth_quad_without_previous_quad() {
        let segs = parse_path("M0 0 L5 5 T10 0").unwrap();
        match segs[2] {
            Segment::Quad { ctrl, .. } => assert_eq!(ctrl, p(5.0, 5.0)),
            other => panic!("expected quad, got {:?}", other),
        }
    }

    #[test]
    fn test_arc_compact_flags() {
        let segs = parse_path("M0 0a5 5 0 1010 0").unwrap();
        match segs[1] {
            Segment::Arc {
                large_arc,
                sweep,
                to,
                ..
            } => {
                assert!(large_arc);
                assert!(!sweep);
                assert_eq!(to, p(10.0, 0.0));
            }
            other => panic!("expected arc, got {:?}", other),
        }
    }

    #[test]
    fn test_close_returns_to_subpath_start() {
        let segs = parse_path("M1 1 L5 1 Z l2 2").unwrap();
        assert_eq!(segs[3].end(), p(3.0, 3.0));
    }

    #[test]
    fn test_invalid_paths() {
        assert!(parse_path("L 1 1").is_err());
        assert!(parse_path("M 1").is_err());
        assert!(parse_path("M 1 1 X 2").is_err());
        assert!(parse_path("M 1 1 Z 3").is_err());
    }

    #[test]
    fn test_empty_path() {
        assert!(parse_path("").unwrap().is_empty());
        assert!(parse_path("   ").unwrap().is_empty());
    }
}
