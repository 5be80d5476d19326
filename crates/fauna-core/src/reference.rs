//! Resource references
//!
//! A [`Reference`] addresses a database resource by path, the way a file
//! system path addresses a file: `classes/frogs/123` is instance `123` of
//! the class `classes/frogs`, which is itself an instance of the root
//! `classes`.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Separator between path segments on the wire
pub const PATH_SEPARATOR: char = '/';

/// Path-structured identifier for a database resource or resource class
///
/// Always holds at least one segment, and no segment is empty or contains
/// [`PATH_SEPARATOR`].
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reference {
    segments: Vec<String>,
}

impl Reference {
    /// Create a reference from its path segments
    ///
    /// ```
    /// use fauna_core::Reference;
    ///
    /// let frog = Reference::new(["classes", "frogs", "123"]).unwrap();
    /// assert_eq!(frog.to_string(), "classes/frogs/123");
    /// ```
    pub fn new<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(Error::InvalidReference(
                "a reference needs at least one segment".to_string(),
            ));
        }
        for segment in &segments {
            validate_segment(segment)?;
        }
        Ok(Self { segments })
    }

    /// Parse a `/`-separated path such as `classes/frogs/123`
    pub fn parse(path: &str) -> Result<Self> {
        Self::new(path.split(PATH_SEPARATOR))
    }

    /// Append an instance identifier to this reference
    pub fn child(&self, id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        validate_segment(&id)?;
        let mut segments = self.segments.clone();
        segments.push(id);
        Ok(Self { segments })
    }

    /// Returns true for a single-segment root/class reference
    pub fn is_class(&self) -> bool {
        self.segments.len() == 1
    }

    /// The reference with the trailing instance identifier removed
    ///
    /// A class reference is returned unchanged.
    pub fn to_class(&self) -> Reference {
        if self.is_class() {
            return self.clone();
        }
        Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        }
    }

    /// The trailing instance identifier
    pub fn id(&self) -> Result<&str> {
        match self.segments.as_slice() {
            [_, .., id] => Ok(id.as_str()),
            _ => Err(Error::InvalidOperation(format!(
                "reference {} has no id",
                self
            ))),
        }
    }

    /// The path segments, root first
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The wire path: segments joined by `/`
    pub fn path(&self) -> String {
        self.segments.join("/")
    }
}

fn validate_segment(segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(Error::InvalidReference(
            "reference segments must not be empty".to_string(),
        ));
    }
    if segment.contains(PATH_SEPARATOR) {
        return Err(Error::InvalidReference(format!(
            "segment '{}' contains '{}'",
            segment, PATH_SEPARATOR
        )));
    }
    Ok(())
}

impl FromStr for Reference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reference({})", self.path())
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
