pub mod config;
pub mod error;
pub mod filter;
pub mod gbis;

pub use error::SegmentError;

use image::{ImageBuffer, Luma, Rgb, RgbImage};
use log::{debug, info};
use rand::Rng;
use serde::{Serialize, Serializer};

use crate::gbis::{assign_labels, merge_small_components, segment_graph, PixelGrid};

/// A single real-valued image channel.
pub type Channel = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Per-pixel component labels, starting at 1.
pub type LabelImage = ImageBuffer<Luma<u32>, Vec<u32>>;

/// Tuning parameters of the segmentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Params {
    /// Standard deviation of the Gaussian applied to each channel before the
    /// graph is built. 0 disables smoothing.
    pub sigma: f32,
    /// Threshold constant `c`. Larger values prefer larger components.
    pub k: f32,
    /// Components smaller than this are merged into a neighbour.
    pub min_size: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            sigma: 0.5,
            k: 500.0,
            min_size: 20,
        }
    }
}

impl Params {
    fn validate(&self) -> Result<(), SegmentError> {
        if !(0.0..=filter::MAX_SIGMA).contains(&self.sigma) {
            return Err(SegmentError::InvalidSigma(self.sigma));
        }
        if !self.k.is_finite() || self.k < 0.0 {
            return Err(SegmentError::InvalidThreshold(self.k));
        }
        if self.min_size == 0 {
            return Err(SegmentError::InvalidMinSize);
        }
        Ok(())
    }
}

#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Component label of every pixel, in `1..=num_components`.
    pub labels: LabelImage,

    /// Number of components.
    pub num_components: usize,
}

impl Segmentation {
    /// Labels shifted down to start at 0.
    pub fn zero_based(&self) -> LabelImage {
        let mut out = self.labels.clone();
        for p in out.pixels_mut() {
            p.0[0] -= 1;
        }
        out
    }

    /// Pixel count of each component, indexed by `label - 1`.
    pub fn component_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.num_components];
        for p in self.labels.pixels() {
            sizes[p.0[0] as usize - 1] += 1;
        }
        sizes
    }
}

impl Serialize for Segmentation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        struct Report<'a> {
            width: u32,
            height: u32,
            num_components: usize,
            labels: &'a [u32],
        }

        Report {
            width: self.labels.width(),
            height: self.labels.height(),
            num_components: self.num_components,
            labels: self.labels.as_raw(),
        }
        .serialize(serializer)
    }
}

/// Split an 8-bit RGB image into three real-valued channels.
pub fn split_channels(image: &RgbImage) -> [Channel; 3] {
    let (width, height) = image.dimensions();
    let plane = |c: usize| {
        ImageBuffer::from_fn(width, height, |x, y| {
            Luma([image.get_pixel(x, y).0[c] as f32])
        })
    };
    [plane(0), plane(1), plane(2)]
}

/// Segment an 8-bit RGB image.
pub fn segment_image(image: &RgbImage, params: &Params) -> Result<Segmentation, SegmentError> {
    segment_channels(&split_channels(image), params)
}

/// Segment an image given as three real-valued channels of equal size.
pub fn segment_channels(
    channels: &[Channel; 3],
    params: &Params,
) -> Result<Segmentation, SegmentError> {
    params.validate()?;
    let dims = channels.each_ref().map(|c| c.dimensions());
    if dims[1] != dims[0] || dims[2] != dims[0] {
        return Err(SegmentError::ChannelMismatch(dims));
    }
    let (width, height) = dims[0];
    if width == 0 || height == 0 {
        return Err(SegmentError::EmptyImage { width, height });
    }
    for (channel, plane) in channels.iter().enumerate() {
        let bad = plane
            .enumerate_pixels()
            .find(|(_, _, p)| !p.0[0].is_finite());
        if let Some((x, y, _)) = bad {
            return Err(SegmentError::NonFiniteSample { channel, x, y });
        }
    }

    let smoothed = channels.each_ref().map(|c| filter::smooth(c, params.sigma));
    debug!("smoothed {width}x{height} channels with sigma {}", params.sigma);

    let grid = PixelGrid(smoothed);
    let mut edges = grid.edges();
    debug!("built {} edges", edges.len());

    let num_nodes = width as usize * height as usize;
    let mut universe = segment_graph(num_nodes, &mut edges, params.k);
    debug!(
        "adaptive merge left {} components (k = {})",
        universe.num_sets(),
        params.k
    );

    merge_small_components(&mut universe, &edges, params.min_size);
    let num_components = universe.num_sets();
    debug!(
        "{num_components} components after enforcing min size {}",
        params.min_size
    );

    let labels = assign_labels(&mut universe, width, height);
    info!("segmented {width}x{height} image into {num_components} components");

    Ok(Segmentation {
        labels,
        num_components,
    })
}

/// Paint every component with a random color drawn from `rng`.
///
/// `labels` must hold labels in `1..=num_components`.
pub fn colorize<R: Rng + ?Sized>(
    labels: &LabelImage,
    num_components: usize,
    rng: &mut R,
) -> RgbImage {
    let colors: Vec<Rgb<u8>> = (0..num_components).map(|_| Rgb(rng.gen())).collect();
    ImageBuffer::from_fn(labels.width(), labels.height(), |x, y| {
        colors[labels.get_pixel(x, y).0[0] as usize - 1]
    })
}
