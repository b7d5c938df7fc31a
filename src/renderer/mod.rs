//! Court rendering
//!
//! Draws the post-tick state onto a `Surface`, scaling the fixed logical
//! arena to whatever size the host gave the surface.

pub mod surface;

pub use surface::{Color, CommandBuffer, DrawCommand, Prompt, Surface};

use glam::Vec2;

use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{GamePhase, Rect, SharedState};

/// Everything the renderer needs for one frame
#[derive(Debug, Clone)]
pub struct FrameView<'a> {
    pub state: &'a SharedState,
    pub phase: GamePhase,
    pub left_name: Option<String>,
    pub right_name: Option<String>,
}

/// Stateful only in which prompt is currently shown
#[derive(Debug, Default)]
pub struct Renderer {
    shown_prompt: Option<Prompt>,
    show_names: bool,
    center_line: bool,
}

impl Renderer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            shown_prompt: None,
            show_names: settings.show_names,
            center_line: settings.center_line,
        }
    }

    /// Size the canvas to its container, keeping a small inset
    pub fn resize(&self, surface: &mut dyn Surface, container: Vec2) {
        surface.resize(container.x - CANVAS_INSET, container.y - CANVAS_INSET);
    }

    pub fn draw(&mut self, surface: &mut dyn Surface, view: &FrameView) {
        let size = surface.size();
        let scale = size / Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        let wall = GRID * scale.y;

        surface.clear();

        // Walls
        surface.fill_rect(Rect::new(0.0, 0.0, size.x, wall), Color::LightGrey);
        surface.fill_rect(Rect::new(0.0, size.y - wall, size.x, wall), Color::LightGrey);

        // Dotted line down the middle
        if self.center_line && wall > 0.0 {
            let dash = GRID * scale.x;
            let mut y = wall;
            while y < size.y - wall {
                surface.fill_rect(
                    Rect::new(size.x / 2.0 - dash / 2.0, y, dash, wall),
                    Color::LightGrey,
                );
                y += wall * 2.0;
            }
        }

        if view.phase == GamePhase::Reconciling {
            return;
        }

        if self.show_names {
            let text_y = wall * 2.0 + 8.0;
            if let Some(name) = &view.left_name {
                surface.fill_text(name, Vec2::new(8.0, text_y));
            }
            if let Some(name) = &view.right_name {
                surface.fill_text(name, Vec2::new(size.x / 2.0 + wall / 2.0 + 8.0, text_y));
            }
        }

        let prompt = match view.phase {
            GamePhase::Spectating => Some(Prompt::InsertCoin),
            GamePhase::Waiting => Some(Prompt::WaitingForOpponent),
            GamePhase::Playing | GamePhase::Reconciling => None,
        };
        if prompt != self.shown_prompt {
            surface.show_prompt(prompt);
            self.shown_prompt = prompt;
        }

        if view.phase != GamePhase::Playing {
            return;
        }

        let state = view.state;
        surface.fill_rect(state.left_paddle.rect().scaled(scale), Color::White);
        surface.fill_rect(state.right_paddle.rect().scaled(scale), Color::White);
        surface.fill_rect(state.ball.rect().scaled(scale), Color::White);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(state: &SharedState, phase: GamePhase) -> FrameView<'_> {
        FrameView {
            state,
            phase,
            left_name: Some("alice#1".into()),
            right_name: None,
        }
    }

    #[test]
    fn test_playing_frame_draws_entities_scaled() {
        let state = SharedState::new(0.0);
        let mut surface = CommandBuffer::new(CANVAS_WIDTH * 2.0, CANVAS_HEIGHT * 2.0);
        let mut renderer = Renderer::new(&Settings::default());

        renderer.draw(&mut surface, &view(&state, GamePhase::Playing));

        let white: Vec<_> = surface.rects(Color::White).copied().collect();
        assert_eq!(white.len(), 3);
        assert_eq!(white[2], Rect::new(750.0, 585.0, 30.0, 30.0));
        assert_eq!(surface.texts().collect::<Vec<_>>(), vec!["alice#1"]);
        assert_eq!(surface.prompt, None);
    }

    #[test]
    fn test_spectator_sees_prompt_without_entities() {
        let state = SharedState::new(0.0);
        let mut surface = CommandBuffer::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        let mut renderer = Renderer::new(&Settings::default());

        renderer.draw(&mut surface, &view(&state, GamePhase::Spectating));
        assert_eq!(surface.prompt, Some(Prompt::InsertCoin));
        assert_eq!(surface.prompt_text, Some("press ← or → to insert coin"));
        assert_eq!(surface.rects(Color::White).count(), 0);

        // Prompt is only toggled on change
        renderer.draw(&mut surface, &view(&state, GamePhase::Spectating));
        assert_eq!(surface.prompt_changes, 1);

        renderer.draw(&mut surface, &view(&state, GamePhase::Waiting));
        assert_eq!(surface.prompt, Some(Prompt::WaitingForOpponent));
        assert_eq!(
            surface.prompt_text,
            Some("wait for the other, press [x] to exit")
        );
        assert_eq!(surface.prompt_changes, 2);
    }

    #[test]
    fn test_reconciling_frame_draws_court_only() {
        let state = SharedState::new(0.0);
        let mut surface = CommandBuffer::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        let mut renderer = Renderer::new(&Settings::default());

        renderer.draw(&mut surface, &view(&state, GamePhase::Reconciling));
        assert_eq!(surface.texts().count(), 0);
        assert_eq!(surface.prompt_changes, 0);
        assert!(surface.rects(Color::LightGrey).count() > 2);
    }

    #[test]
    fn test_resize_insets_canvas() {
        let mut surface = CommandBuffer::new(0.0, 0.0);
        let renderer = Renderer::new(&Settings::default());
        renderer.resize(&mut surface, Vec2::new(408.0, 308.0));
        assert_eq!(surface.size(), Vec2::new(400.0, 300.0));
    }
}
