//! Viewer state machine.
//!
//! The controller is the only writer of the active index vector and the active
//! axis. Each [`ViewerEvent`] is handled to completion and answered with the
//! [`DisplayRequest`]s the display surface has to apply.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::cache::{ImageCache, ImageHandle};
use crate::index::{Coordinate, ParameterIndex};
use crate::resolver::{coordinate_of, lookup, nearest_index_vector, step, IndexVector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    fn delta(self) -> isize {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    SelectAxis(usize),
    Step(ScrollDirection),
    SetAxisValue { axis: usize, value: f64 },
}

impl ViewerEvent {
    /// Keys `1`..`9` select axes 0..8.
    pub fn from_digit_key(digit: u8) -> Option<Self> {
        match digit {
            1..=9 => Some(Self::SelectAxis(usize::from(digit - 1))),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DisplayRequest {
    ShowImage { path: PathBuf, image: ImageHandle },
    SetAxisWidget { axis: usize, value: f64, active: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    pub indices: IndexVector,
    pub active_axis: usize,
    pub coordinate: Coordinate,
    /// Last value each axis widget reported or was told to show.
    pub widget_values: Vec<f64>,
    /// Set when the last requested coordinate had no figure.
    pub missing: bool,
}

pub struct ViewerController {
    index: ParameterIndex,
    cache: ImageCache,
    state: ViewerState,
    displayed: Option<PathBuf>,
}

impl ViewerController {
    pub fn new(index: ParameterIndex, cache: ImageCache) -> Self {
        let start = index
            .coordinates()
            .first()
            .map(|coordinate| coordinate.values().to_vec())
            .unwrap_or_else(|| index.ranges().iter().map(|range| range.min()).collect());
        let indices = nearest_index_vector(&start, index.ranges());
        let coordinate = coordinate_of(&indices, index.ranges());

        Self {
            state: ViewerState {
                indices,
                active_axis: 0,
                widget_values: coordinate.values().to_vec(),
                coordinate,
                missing: false,
            },
            index,
            cache,
            displayed: None,
        }
    }

    pub fn index(&self) -> &ParameterIndex {
        &self.index
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    pub fn displayed_path(&self) -> Option<&Path> {
        self.displayed.as_deref()
    }

    /// Labels every axis widget and shows the starting figure.
    pub fn initial_requests(&mut self) -> Result<Vec<DisplayRequest>> {
        let mut requests = self.axis_widget_requests();
        self.push_display_request(&mut requests)?;
        Ok(requests)
    }

    /// On error the state is left as it was before the event.
    pub fn handle(&mut self, event: ViewerEvent) -> Result<Vec<DisplayRequest>> {
        let previous = self.state.clone();
        let result = match event {
            ViewerEvent::SelectAxis(axis) => Ok(self.select_axis(axis)),
            ViewerEvent::Step(direction) => self.step_active_axis(direction),
            ViewerEvent::SetAxisValue { axis, value } => self.set_axis_value(axis, value),
        };
        if result.is_err() {
            self.state = previous;
        }
        result
    }

    fn select_axis(&mut self, axis: usize) -> Vec<DisplayRequest> {
        if axis >= self.index.axis_count() {
            log::debug!("Ignoring selection of axis {axis}");
            return Vec::new();
        }
        self.state.active_axis = axis;
        self.axis_widget_requests()
    }

    fn step_active_axis(&mut self, direction: ScrollDirection) -> Result<Vec<DisplayRequest>> {
        let axis = self.state.active_axis;
        self.state.indices = step(
            &self.state.indices,
            axis,
            direction.delta(),
            self.index.ranges(),
        );
        self.state.coordinate = coordinate_of(&self.state.indices, self.index.ranges());

        let value = self.state.coordinate.values()[axis];
        self.state.widget_values[axis] = value;
        let mut requests = vec![DisplayRequest::SetAxisWidget {
            axis,
            value,
            active: true,
        }];
        self.push_display_request(&mut requests)?;
        Ok(requests)
    }

    fn set_axis_value(&mut self, axis: usize, value: f64) -> Result<Vec<DisplayRequest>> {
        let Some(slot) = self.state.widget_values.get_mut(axis) else {
            log::debug!("Ignoring value for unknown axis {axis}");
            return Ok(Vec::new());
        };
        *slot = value;

        self.state.indices = nearest_index_vector(&self.state.widget_values, self.index.ranges());
        self.state.coordinate = coordinate_of(&self.state.indices, self.index.ranges());

        let snapped = self.state.coordinate.values()[axis];
        self.state.widget_values[axis] = snapped;
        let mut requests = vec![DisplayRequest::SetAxisWidget {
            axis,
            value: snapped,
            active: axis == self.state.active_axis,
        }];
        self.push_display_request(&mut requests)?;
        Ok(requests)
    }

    fn axis_widget_requests(&self) -> Vec<DisplayRequest> {
        self.state
            .coordinate
            .values()
            .iter()
            .enumerate()
            .map(|(axis, &value)| DisplayRequest::SetAxisWidget {
                axis,
                value,
                active: axis == self.state.active_axis,
            })
            .collect()
    }

    // Leaves the display untouched on a sparse miss or when the figure is
    // already on screen.
    fn push_display_request(&mut self, requests: &mut Vec<DisplayRequest>) -> Result<()> {
        let Some(path) = lookup(&self.state.coordinate, &self.index).map(Path::to_path_buf) else {
            log::debug!("No figure at {}", self.state.coordinate);
            self.state.missing = true;
            return Ok(());
        };
        self.state.missing = false;
        if self.displayed.as_deref() == Some(path.as_path()) {
            return Ok(());
        }

        let image = self.cache.get(&path)?;
        self.displayed = Some(path.clone());
        requests.push(DisplayRequest::ShowImage { path, image });
        Ok(())
    }
}
