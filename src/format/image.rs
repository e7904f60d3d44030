//! Fallback for images that fail to load.

/// Anything that displays an image from a source URL.
pub trait ImageSource {
    fn src(&self) -> &str;
    fn set_src(&mut self, src: &str);
}

/// A plain image element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageElement {
    src: String,
}

impl ImageElement {
    pub fn new(src: impl Into<String>) -> Self {
        Self { src: src.into() }
    }
}

impl ImageSource for ImageElement {
    fn src(&self) -> &str {
        &self.src
    }

    fn set_src(&mut self, src: &str) {
        self.src.clear();
        self.src.push_str(src);
    }
}

/// A load failure reported for one image.
#[derive(Debug)]
pub struct ImageErrorEvent<'a, T: ImageSource + ?Sized> {
    target: &'a mut T,
}

impl<'a, T: ImageSource + ?Sized> ImageErrorEvent<'a, T> {
    pub fn new(target: &'a mut T) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &T {
        &*self.target
    }
}

/// Point the failed image at `default_image`.
///
/// Sets the source exactly once per call; calling it again with the same
/// default leaves the source as it is.
pub fn handle_image_error<T: ImageSource + ?Sized>(event: ImageErrorEvent<'_, T>, default_image: &str) {
    tracing::debug!(
        failed_src = %event.target.src(),
        fallback = %default_image,
        "Image failed to load, using fallback"
    );
    event.target.set_src(default_image);
}
