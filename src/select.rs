//! Channel selection with zero-copy views where possible.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::Error;
use crate::view::{ChannelArray, ChannelView, Sample};

/// Result of a channel selection.
///
/// `View` borrows the image buffer; `Owned` holds freshly copied samples.
#[derive(Debug, Clone)]
pub enum Selection<'a> {
    View(ChannelView<'a>),
    Owned(ChannelArray),
}

impl<'a> Selection<'a> {
    pub fn shape(&self) -> [usize; 3] {
        match self {
            Selection::View(view) => view.shape(),
            Selection::Owned(array) => array.shape(),
        }
    }

    pub fn is_view(&self) -> bool {
        matches!(self, Selection::View(_))
    }

    pub fn is_empty(&self) -> bool {
        self.shape().iter().product::<usize>() == 0
    }

    /// Strided view over the selected samples.
    pub fn view(&self) -> ChannelView<'_> {
        match self {
            Selection::View(view) => *view,
            Selection::Owned(array) => array.view(),
        }
    }

    /// True if the selection reads from `region` instead of its own memory.
    pub fn aliases(&self, region: &[u8]) -> bool {
        match self {
            Selection::View(view) => view.aliases(region),
            Selection::Owned(_) => false,
        }
    }

    pub fn get<T: Sample>(&self, index: [usize; 3]) -> Option<T> {
        self.view().get(index)
    }

    pub fn to_vec<T: Sample>(&self) -> Result<Vec<T>, Error> {
        self.view().to_vec()
    }

    /// Widens every sample to `f32`.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.view().to_f32_vec()
    }
}

/// Maps channel names to on-disk indices.
pub fn channel_indices(
    names: &[&str],
    channel_map: &BTreeMap<String, usize>,
) -> Result<Vec<usize>, Error> {
    names
        .iter()
        .map(|name| {
            channel_map
                .get(*name)
                .copied()
                .ok_or_else(|| Error::UnknownChannel(name.to_string()))
        })
        .collect()
}

/// Constant non-zero step between successive indices, if there is one.
fn arithmetic_step(indices: &[usize]) -> Option<isize> {
    let step = indices[1] as isize - indices[0] as isize;
    if step == 0 {
        return None;
    }
    indices
        .windows(2)
        .all(|w| w[1] as isize - w[0] as isize == step)
        .then_some(step)
}

/// Selects channels of `image` by index, in the given order.
///
/// One channel or an arithmetic progression of channels yields a view over
/// `image`; any other order copies the requested planes.
pub fn select<'a>(image: ChannelView<'a>, indices: &[usize], channels_last: bool) -> Selection<'a> {
    let [height, _, width] = image.shape();

    let selection = match indices {
        [] => {
            debug!("empty selection");
            Selection::Owned(ChannelArray::new(
                Vec::new(),
                [height, 0, width],
                image.pixel_type(),
                image.element_size(),
            ))
        }
        [single] => match image.channel(*single) {
            Some(view) => Selection::View(view),
            None => copy_channels(&image, indices),
        },
        _ => match arithmetic_step(indices)
            .and_then(|step| image.slice_channels(indices[0], indices.len(), step))
        {
            Some(view) => {
                debug!(start = indices[0], count = indices.len(), "strided channel view");
                Selection::View(view)
            }
            None => copy_channels(&image, indices),
        },
    };

    if !channels_last {
        return selection;
    }
    match selection {
        Selection::View(view) => Selection::View(view.channels_last()),
        Selection::Owned(array) => Selection::Owned(array.swap_axes(1, 2)),
    }
}

fn copy_channels<'a>(image: &ChannelView<'a>, indices: &[usize]) -> Selection<'a> {
    let [height, channels, width] = image.shape();
    debug!(?indices, "channels not strided, copying planes");
    let element_size = image.element_size();
    let mut data = Vec::with_capacity(height * indices.len() * width * element_size);
    for row in 0..height {
        for &channel in indices {
            debug_assert!(channel < channels);
            image.extend_line(row, channel, &mut data);
        }
    }
    Selection::Owned(ChannelArray::new(
        data,
        [height, indices.len(), width],
        image.pixel_type(),
        element_size,
    ))
}
