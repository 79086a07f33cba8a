use sdl2::keyboard::Keycode;

/// Maps the hex keypad onto the left four columns of a QWERTY keyboard.
/// ```text
/// |1|2|3|C|      |1|2|3|4|
/// |4|5|6|D|  ->  |Q|W|E|R|
/// |7|8|9|E|  ->  |A|S|D|F|
/// |A|0|B|F|      |Z|X|C|V|
/// ```
pub fn keymap(key: Keycode) -> Option<usize> {
    match key {
        Keycode::X => Some(0x0),
        Keycode::Num1 => Some(0x1),
        Keycode::Num2 => Some(0x2),
        Keycode::Num3 => Some(0x3),
        Keycode::Q => Some(0x4),
        Keycode::W => Some(0x5),
        Keycode::E => Some(0x6),
        Keycode::A => Some(0x7),
        Keycode::S => Some(0x8),
        Keycode::D => Some(0x9),
        Keycode::Z => Some(0xA),
        Keycode::C => Some(0xB),
        Keycode::Num4 => Some(0xC),
        Keycode::R => Some(0xD),
        Keycode::F => Some(0xE),
        Keycode::V => Some(0xF),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_mapped_once() {
        let keys = [
            Keycode::Num1, Keycode::Num2, Keycode::Num3, Keycode::Num4,
            Keycode::Q, Keycode::W, Keycode::E, Keycode::R,
            Keycode::A, Keycode::S, Keycode::D, Keycode::F,
            Keycode::Z, Keycode::X, Keycode::C, Keycode::V,
        ];
        let mut seen = [false; 16];
        for key in keys {
            let hex = keymap(key).unwrap();
            assert!(!seen[hex], "key 0x{:x} mapped twice", hex);
            seen[hex] = true;
        }
        assert_eq!(keymap(Keycode::Escape), None);
    }
}
