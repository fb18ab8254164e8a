use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Widget, Wrap};

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileState {
    FaceDown,
    FaceUp,
    Matched,
    /// Held as the first half of a pair.
    Selected,
    Correct,
    Wrong,
}

/// One card on a board. Face-down tiles hide their text.
pub struct CardTile<'a> {
    pub title: &'a str,
    pub caption: Option<&'a str>,
    pub state: TileState,
    pub focused: bool,
    pub theme: &'a Theme,
}

impl<'a> CardTile<'a> {
    pub fn new(title: &'a str, state: TileState, theme: &'a Theme) -> Self {
        Self {
            title,
            caption: None,
            state,
            focused: false,
            theme,
        }
    }

    pub fn caption(mut self, caption: &'a str) -> Self {
        self.caption = Some(caption);
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for CardTile<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let (fill, text) = match self.state {
            TileState::FaceDown => (colors.card_back(), colors.bg()),
            TileState::FaceUp => (colors.card_face(), colors.bg()),
            TileState::Matched => (colors.accent_dim(), colors.success()),
            TileState::Selected => (colors.card_face(), colors.accent()),
            TileState::Correct => (colors.card_face(), colors.success()),
            TileState::Wrong => (colors.card_face(), colors.error()),
        };
        let border = if self.focused {
            colors.border_focused()
        } else {
            colors.border()
        };

        let block = Block::bordered()
            .border_type(if self.focused {
                BorderType::Thick
            } else {
                BorderType::Rounded
            })
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(fill));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = Vec::new();
        if inner.height > 2 {
            lines.push(Line::from(""));
        }
        if self.state == TileState::FaceDown {
            lines.push(Line::from(Span::styled(
                "?",
                Style::default().fg(text).add_modifier(Modifier::BOLD),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                self.title,
                Style::default().fg(text).add_modifier(Modifier::BOLD),
            )));
            if let Some(caption) = self.caption {
                lines.push(Line::from(Span::styled(
                    caption,
                    Style::default().fg(colors.text_pending()),
                )));
            }
        }

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
