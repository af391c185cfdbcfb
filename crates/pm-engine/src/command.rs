//! Parses the byte frames clients send into [`Command`] values. Unknown
//! opcodes are silently ignored (`Ok(None)`); a malformed absolute-move
//! frame is the one case that surfaces as an `Err` for the caller to log.

use pm_shared::Direction;

use crate::error::CommandError;

/// One parsed inbound command frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// `'p'` — pause the game.
    Pause,
    /// `'P'` — resume the game.
    Play,
    /// `'R'` — full game reset.
    Reset,
    /// `'w'`/`'a'`/`'s'`/`'d'` — move one cell in the given direction.
    Move(Direction),
    /// `'x'` + two signed bytes — move toward an absolute cell.
    AbsoluteMove(i8, i8),
}

/// Parses one command frame. `Ok(None)` means the opcode byte is
/// unrecognized and the frame should be silently discarded.
pub fn parse(bytes: &[u8]) -> Result<Option<Command>, CommandError> {
    let Some(&opcode) = bytes.first() else {
        return Ok(None);
    };

    let command = match opcode {
        b'p' => Command::Pause,
        b'P' => Command::Play,
        b'R' => Command::Reset,
        b'w' => Command::Move(Direction::Up),
        b'a' => Command::Move(Direction::Left),
        b's' => Command::Move(Direction::Down),
        b'd' => Command::Move(Direction::Right),
        b'x' => {
            if bytes.len() != 3 {
                return Err(CommandError::MalformedAbsoluteMove { len: bytes.len() });
            }
            Command::AbsoluteMove(bytes[1] as i8, bytes[2] as i8)
        }
        _ => return Ok(None),
    };

    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_directional_moves() {
        assert_eq!(parse(b"w").unwrap(), Some(Command::Move(Direction::Up)));
        assert_eq!(parse(b"a").unwrap(), Some(Command::Move(Direction::Left)));
        assert_eq!(parse(b"s").unwrap(), Some(Command::Move(Direction::Down)));
        assert_eq!(parse(b"d").unwrap(), Some(Command::Move(Direction::Right)));
    }

    #[test]
    fn parses_pause_play_reset() {
        assert_eq!(parse(b"p").unwrap(), Some(Command::Pause));
        assert_eq!(parse(b"P").unwrap(), Some(Command::Play));
        assert_eq!(parse(b"R").unwrap(), Some(Command::Reset));
    }

    #[test]
    fn parses_absolute_move() {
        let frame = [b'x', 10i8 as u8, (-5i8) as u8];
        assert_eq!(parse(&frame).unwrap(), Some(Command::AbsoluteMove(10, -5)));
    }

    #[test]
    fn malformed_absolute_move_is_an_error() {
        assert!(matches!(
            parse(b"x\x01"),
            Err(CommandError::MalformedAbsoluteMove { len: 2 })
        ));
    }

    #[test]
    fn unknown_opcode_is_silently_ignored() {
        assert_eq!(parse(b"z").unwrap(), None);
    }

    #[test]
    fn empty_frame_is_silently_ignored() {
        assert_eq!(parse(b"").unwrap(), None);
    }
}
