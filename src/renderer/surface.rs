//! Drawing surface abstraction
//!
//! The host owns the real canvas; the game only issues fills and text at
//! pixel coordinates. `CommandBuffer` records them instead, for headless
//! runs and tests.

use glam::Vec2;

use crate::sim::Rect;

/// Fill colors used by the court
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Walls and center line
    LightGrey,
    /// Paddles, ball and names
    White,
}

/// Informational overlay shown on top of the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Viewer holds no seat
    InsertCoin,
    /// Viewer is seated, opponent seat empty
    WaitingForOpponent,
}

impl Prompt {
    pub fn text(self) -> &'static str {
        match self {
            Prompt::InsertCoin => "press ← or → to insert coin",
            Prompt::WaitingForOpponent => "wait for the other, press [x] to exit",
        }
    }
}

/// Sink for one viewer's drawing commands
pub trait Surface {
    /// Current drawable size in pixels
    fn size(&self) -> Vec2;

    fn resize(&mut self, width: f32, height: f32);

    /// Start a new frame
    fn clear(&mut self);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn fill_text(&mut self, text: &str, pos: Vec2);

    /// Show the given prompt, or hide the current one
    fn show_prompt(&mut self, prompt: Option<Prompt>);
}

/// A single recorded drawing command
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect { rect: Rect, color: Color },
    Text { text: String, pos: Vec2 },
}

/// Surface that records the last frame's commands
#[derive(Debug, Clone)]
pub struct CommandBuffer {
    size: Vec2,
    pub commands: Vec<DrawCommand>,
    pub prompt: Option<Prompt>,
    /// Text of the visible prompt, as the host would display it
    pub prompt_text: Option<&'static str>,
    /// How many times the prompt was toggled
    pub prompt_changes: usize,
}

impl CommandBuffer {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            commands: Vec::new(),
            prompt: None,
            prompt_text: None,
            prompt_changes: 0,
        }
    }

    pub fn rects(&self, color: Color) -> impl Iterator<Item = &Rect> {
        self.commands.iter().filter_map(move |c| match c {
            DrawCommand::Rect { rect, color: c } if *c == color => Some(rect),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Surface for CommandBuffer {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width.max(0.0), height.max(0.0));
    }

    fn clear(&mut self) {
        self.commands.clear();
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Rect { rect, color });
    }

    fn fill_text(&mut self, text: &str, pos: Vec2) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
        });
    }

    fn show_prompt(&mut self, prompt: Option<Prompt>) {
        self.prompt = prompt;
        self.prompt_text = prompt.map(Prompt::text);
        self.prompt_changes += 1;
    }
}
