use embedded_graphics::pixelcolor::BinaryColor;

/// Colors used to paint the face, all derived from the single inversion
/// flag. `On` ends up white on the panel and `Off` black.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Palette {
    /// Background of the whole face
    pub main_bg: BinaryColor,
    /// Background behind widget text, or `None` to draw straight onto
    /// the face background
    pub text_bg: Option<BinaryColor>,
    /// Widget text
    pub text_fg: BinaryColor,
    /// Footer bar fill
    pub bar_bg: BinaryColor,
    /// Location line in the footer bar
    pub bar_fg: BinaryColor,
}

impl Palette {
    pub fn new(invert_colors: bool) -> Self {
        if invert_colors {
            Self {
                main_bg: BinaryColor::On,
                text_bg: None,
                text_fg: BinaryColor::Off,
                bar_bg: BinaryColor::Off,
                bar_fg: BinaryColor::On,
            }
        } else {
            Self {
                main_bg: BinaryColor::Off,
                text_bg: None,
                text_fg: BinaryColor::On,
                bar_bg: BinaryColor::On,
                bar_fg: BinaryColor::Off,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation() {
        let normal = Palette::new(false);
        assert_eq!(normal.main_bg, BinaryColor::Off);
        assert_eq!(normal.text_fg, BinaryColor::On);
        assert_eq!(normal.bar_bg, BinaryColor::On);
        assert_eq!(normal.bar_fg, BinaryColor::Off);

        // Inversion swaps every pair but leaves text backgrounds alone
        let inverted = Palette::new(true);
        assert_eq!(inverted.main_bg, BinaryColor::On);
        assert_eq!(inverted.text_fg, BinaryColor::Off);
        assert_eq!(inverted.bar_bg, BinaryColor::Off);
        assert_eq!(inverted.bar_fg, BinaryColor::On);
        assert_eq!(inverted.text_bg, normal.text_bg);
    }
}
