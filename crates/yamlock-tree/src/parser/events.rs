//! Cross-checking against the yaml-rust2 event stream.
//!
//! yaml-rust2 is the authority on YAML validity and on the decoded text of
//! scalars (escapes, folding, chomping). Its events are collected into a
//! flat shape list and aligned with the tree built by the block parser:
//! collection boundaries and scalar styles must match one for one, and each
//! scalar takes its decoded value from the matching event.

use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};

use crate::error::{Error, Result, SourceLocation};
use crate::node::{Node, NodeKind, Style};

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    MappingStart,
    MappingEnd,
    SequenceStart,
    SequenceEnd,
    Scalar(String, Style),
}

#[derive(Debug)]
pub(crate) struct ShapeEvent {
    shape: Shape,
    location: SourceLocation,
}

fn location_of(marker: &Marker) -> SourceLocation {
    SourceLocation {
        offset: marker.index(),
        line: marker.line(),
        column: marker.col() + 1,
    }
}

#[allow(unreachable_patterns)]
fn scalar_style(style: TScalarStyle) -> Style {
    match style {
        TScalarStyle::SingleQuoted => Style::SingleQuoted,
        TScalarStyle::DoubleQuoted => Style::DoubleQuoted,
        TScalarStyle::Literal => Style::Literal,
        TScalarStyle::Folded => Style::Folded,
        TScalarStyle::Plain => Style::Plain,
        _ => Style::Plain,
    }
}

/// Receiver that records structural events and rejects the YAML features
/// the tree cannot represent.
#[derive(Default)]
struct ShapeCollector {
    events: Vec<ShapeEvent>,
    documents: usize,
    error: Option<Error>,
}

impl ShapeCollector {
    fn reject(&mut self, message: &str, location: SourceLocation) {
        if self.error.is_none() {
            self.error = Some(Error::parse(message, location));
        }
    }

    fn check_properties<T>(&mut self, anchor_id: usize, tag: &Option<T>, location: SourceLocation) {
        if anchor_id != 0 {
            self.reject("anchors are not supported", location);
        } else if tag.is_some() {
            self.reject("tags are not supported", location);
        }
    }

    fn push(&mut self, shape: Shape, location: SourceLocation) {
        self.events.push(ShapeEvent { shape, location });
    }
}

impl MarkedEventReceiver for ShapeCollector {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }
        let location = location_of(&marker);
        match ev {
            Event::DocumentStart => {
                self.documents += 1;
                if self.documents > 1 {
                    self.reject("only one document is supported", location);
                }
            }
            Event::Alias(_) => self.reject("aliases are not supported", location),
            Event::Scalar(value, style, anchor_id, tag) => {
                self.check_properties(anchor_id, &tag, location);
                self.push(Shape::Scalar(value, scalar_style(style)), location);
            }
            Event::SequenceStart(anchor_id, tag) => {
                self.check_properties(anchor_id, &tag, location);
                self.push(Shape::SequenceStart, location);
            }
            Event::SequenceEnd => self.push(Shape::SequenceEnd, location),
            Event::MappingStart(anchor_id, tag) => {
                self.check_properties(anchor_id, &tag, location);
                self.push(Shape::MappingStart, location);
            }
            Event::MappingEnd => self.push(Shape::MappingEnd, location),
            _ => {}
        }
    }
}

/// Run yaml-rust2 over `content` and collect its structural events.
pub(crate) fn collect(content: &str) -> Result<Vec<ShapeEvent>> {
    let mut parser = Parser::new_from_str(content);
    let mut collector = ShapeCollector::default();
    parser.load(&mut collector, true).map_err(Error::from)?;
    match collector.error {
        Some(err) => Err(err),
        None => Ok(collector.events),
    }
}

struct Aligner {
    events: std::vec::IntoIter<ShapeEvent>,
    end: SourceLocation,
}

impl Aligner {
    fn unsupported(location: SourceLocation) -> Error {
        Error::parse("unsupported YAML construct", location)
    }

    fn next(&mut self) -> Result<ShapeEvent> {
        let end = self.end;
        self.events.next().ok_or_else(|| Self::unsupported(end))
    }

    fn expect(&mut self, shape: Shape) -> Result<()> {
        let event = self.next()?;
        if event.shape == shape {
            Ok(())
        } else {
            Err(Self::unsupported(event.location))
        }
    }

    fn align(&mut self, node: &mut Node) -> Result<()> {
        let style = node.style();
        match node.kind_mut() {
            NodeKind::Document(root) => self.align(root),
            NodeKind::Mapping(pairs) => {
                self.expect(Shape::MappingStart)?;
                for pair in pairs {
                    self.align(&mut pair.key)?;
                    self.align(&mut pair.value)?;
                }
                self.expect(Shape::MappingEnd)
            }
            NodeKind::Sequence(items) => {
                self.expect(Shape::SequenceStart)?;
                for item in items {
                    self.align(item)?;
                }
                self.expect(Shape::SequenceEnd)
            }
            NodeKind::Scalar(scalar) => {
                let event = self.next()?;
                match event.shape {
                    Shape::Scalar(value, event_style) if event_style == style => {
                        // An empty plain scalar is reported as `~`.
                        if scalar.source_text() != Some("") {
                            scalar.set_decoded(value);
                        }
                        Ok(())
                    }
                    _ => Err(Self::unsupported(event.location)),
                }
            }
        }
    }
}

/// Copy decoded scalar values from `events` into `document`, failing when
/// the two disagree on structure.
pub(crate) fn apply(
    document: &mut Node,
    events: Vec<ShapeEvent>,
    end: SourceLocation,
) -> Result<()> {
    let mut aligner = Aligner {
        events: events.into_iter(),
        end,
    };
    aligner.align(document)?;
    match aligner.events.next() {
        Some(extra) => Err(Aligner::unsupported(extra.location)),
        None => Ok(()),
    }
}
