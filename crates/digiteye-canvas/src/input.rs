//! Pointer and touch events, and how they drive a stroke.

use serde::{Deserialize, Serialize};

/// A position in client (event) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClientPoint {
    pub x: f32,
    pub y: f32,
}

impl ClientPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Raw input delivered to the canvas.
///
/// Mouse and touch modalities map onto the same stroke operations. For
/// touches only the first contact point is tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerInput {
    MouseDown { x: f32, y: f32 },
    MouseMove { x: f32, y: f32 },
    MouseUp,
    MouseLeave,
    TouchStart { touches: Vec<ClientPoint> },
    TouchMove { touches: Vec<ClientPoint> },
    TouchEnd,
    TouchCancel,
}

/// The stroke operation an input resolves to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeAction {
    Begin(ClientPoint),
    Extend(ClientPoint),
    End,
    Ignore,
}

impl PointerInput {
    pub fn action(&self) -> StrokeAction {
        match self {
            Self::MouseDown { x, y } => StrokeAction::Begin(ClientPoint::new(*x, *y)),
            Self::MouseMove { x, y } => StrokeAction::Extend(ClientPoint::new(*x, *y)),
            Self::TouchStart { touches } => touches
                .first()
                .map_or(StrokeAction::Ignore, |t| StrokeAction::Begin(*t)),
            Self::TouchMove { touches } => touches
                .first()
                .map_or(StrokeAction::Ignore, |t| StrokeAction::Extend(*t)),
            Self::MouseUp | Self::MouseLeave | Self::TouchEnd | Self::TouchCancel => {
                StrokeAction::End
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_and_touch_map_alike() {
        let mouse = PointerInput::MouseDown { x: 3.0, y: 4.0 }.action();
        let touch = PointerInput::TouchStart {
            touches: vec![ClientPoint::new(3.0, 4.0)],
        }
        .action();
        assert_eq!(mouse, touch);
        assert_eq!(PointerInput::MouseLeave.action(), PointerInput::TouchEnd.action());
    }

    #[test]
    fn test_only_first_touch_is_tracked() {
        let input = PointerInput::TouchMove {
            touches: vec![ClientPoint::new(1.0, 1.0), ClientPoint::new(200.0, 200.0)],
        };
        assert_eq!(input.action(), StrokeAction::Extend(ClientPoint::new(1.0, 1.0)));
    }

    #[test]
    fn test_touch_without_points_is_ignored() {
        let input = PointerInput::TouchStart { touches: vec![] };
        assert_eq!(input.action(), StrokeAction::Ignore);
    }

    #[test]
    fn test_input_json_shape() {
        let input: PointerInput =
            serde_json::from_str(r#"{"type": "mouse_move", "x": 10, "y": 12.5}"#).unwrap();
        assert_eq!(input, PointerInput::MouseMove { x: 10.0, y: 12.5 });

        let input: PointerInput = serde_json::from_str(r#"{"type": "touch_end"}"#).unwrap();
        assert_eq!(input.action(), StrokeAction::End);
    }
}
