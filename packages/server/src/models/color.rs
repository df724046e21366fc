use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    // player colors, in the order the pool hands them out
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    Purple,
    Pink,
    Teal,
    Brown,
    Lime,
    Navy,
    Maroon,
    Olive,
    Silver,
    Coral,
    // system colors
    Highlight,
    Danger,
    Info,
    Mafia,
    Dead,
}

pub const PLAYER_COLORS: [Color; 15] = [
    Color::Red,
    Color::Blue,
    Color::Green,
    Color::Yellow,
    Color::Orange,
    Color::Purple,
    Color::Pink,
    Color::Teal,
    Color::Brown,
    Color::Lime,
    Color::Navy,
    Color::Maroon,
    Color::Olive,
    Color::Silver,
    Color::Coral,
];

/// Finite set of player colors. Colors go back into the pool when their
/// holder leaves and are always handed out in canonical order.
#[derive(Debug, Clone)]
pub struct ColorPool {
    available: Vec<Color>,
}

impl Default for ColorPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorPool {
    pub fn new() -> Self {
        Self {
            available: PLAYER_COLORS.to_vec(),
        }
    }

    pub fn take(&mut self) -> Option<Color> {
        if self.available.is_empty() {
            None
        } else {
            Some(self.available.remove(0))
        }
    }

    pub fn give_back(&mut self, color: Color) {
        if !PLAYER_COLORS.contains(&color) || self.available.contains(&color) {
            return;
        }
        self.available.push(color);
        self.available
            .sort_by_key(|c| PLAYER_COLORS.iter().position(|p| p == c));
    }

    pub fn len(&self) -> usize {
        self.available.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reclaimed_color_is_handed_out_first() {
        let mut pool = ColorPool::new();
        let red = pool.take().unwrap();
        let blue = pool.take().unwrap();
        assert_eq!((red, blue), (Color::Red, Color::Blue));

        pool.give_back(red);
        assert_eq!(pool.take(), Some(Color::Red));
        assert_eq!(pool.take(), Some(Color::Green));
    }

    #[test]
    fn test_system_colors_never_enter_pool() {
        let mut pool = ColorPool::new();
        pool.give_back(Color::Danger);
        pool.give_back(Color::Red);
        assert_eq!(pool.len(), PLAYER_COLORS.len());
    }
}
