//! Access to the bytes of a publication resource.

use std::borrow::Cow;
use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::util::{decode_text, extract_meta_charset, extract_xml_encoding};

/// A readable resource of a publication.
pub trait Resource {
    /// Href of the resource, relative to the publication root.
    fn href(&self) -> &str;

    fn media_type(&self) -> &str;

    /// Read the whole resource.
    fn read(&mut self) -> Result<Cow<'_, [u8]>>;

    /// Read the resource as text, honoring its declared encoding.
    fn read_as_string(&mut self) -> Result<String> {
        let bytes = self.read()?;
        let hint = extract_xml_encoding(&bytes).or_else(|| extract_meta_charset(&bytes));
        Ok(decode_text(&bytes, hint).into_owned())
    }

    /// Release whatever the resource holds. Reading again must still work.
    fn close(&mut self) {}
}

impl<R: Resource + ?Sized> Resource for Box<R> {
    fn href(&self) -> &str {
        (**self).href()
    }

    fn media_type(&self) -> &str {
        (**self).media_type()
    }

    fn read(&mut self) -> Result<Cow<'_, [u8]>> {
        (**self).read()
    }

    fn read_as_string(&mut self) -> Result<String> {
        (**self).read_as_string()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// A resource held in memory.
#[derive(Debug, Clone)]
pub struct MemoryResource {
    href: String,
    media_type: String,
    data: Vec<u8>,
}

impl MemoryResource {
    pub fn new(href: impl Into<String>, media_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            href: href.into(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }
}

impl Resource for MemoryResource {
    fn href(&self) -> &str {
        &self.href
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }

    fn read(&mut self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(self.data.as_slice()))
    }
}

/// A resource read from the file system.
///
/// The file is loaded on first read and dropped again on [`Resource::close`].
#[derive(Debug)]
pub struct FileResource {
    href: String,
    media_type: String,
    path: PathBuf,
    cache: Option<Vec<u8>>,
}

impl FileResource {
    pub fn new(href: impl Into<String>, media_type: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            href: href.into(),
            media_type: media_type.into(),
            path: path.into(),
            cache: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.is_some()
    }
}

impl Resource for FileResource {
    fn href(&self) -> &str {
        &self.href
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }

    fn read(&mut self) -> Result<Cow<'_, [u8]>> {
        let data = match self.cache.take() {
            Some(data) => data,
            None => fs::read(&self.path).map_err(|e| Error::resource(&self.href, e))?,
        };
        Ok(Cow::Borrowed(self.cache.insert(data).as_slice()))
    }

    fn close(&mut self) {
        self.cache = None;
    }
}

/// Closes the wrapped resource when dropped.
pub(crate) struct CloseGuard<'a, R: Resource + ?Sized>(pub &'a mut R);

impl<R: Resource + ?Sized> Drop for CloseGuard<'_, R> {
    fn drop(&mut self) {
        self.0.close();
    }
}
