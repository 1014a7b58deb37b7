use crossterm::event::Event as CrossTermEvent;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;

use crate::events::AppEvent;
use crate::events::Direction;
use crate::events::EngineEvent;
use crate::events::Event;

/// Converts a crossterm event into a gridlife event
pub fn convert_event(event: CrossTermEvent) -> Option<Event> {
    match event {
        CrossTermEvent::Key(key_event) => convert_key(key_event),
        CrossTermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) => Some(AppEvent::Click { column, row }.into()),
        CrossTermEvent::Resize(cols, rows) => Some(AppEvent::Resize { cols, rows }.into()),
        _ => None,
    }
}

fn convert_key(key_event: KeyEvent) -> Option<Event> {
    // Some platforms report releases too
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    let event: Event = match key_event {
        KeyEvent {
            code: KeyCode::Char('q'),
            ..
        }
        | KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            ..
        } => AppEvent::Exit.into(),

        KeyEvent {
            code: KeyCode::Char(' ' | 'p'),
            ..
        } => EngineEvent::PlayPause.into(),
        KeyEvent {
            code: KeyCode::Char('r'),
            ..
        } => EngineEvent::Reset.into(),
        KeyEvent {
            code: KeyCode::Char('n'),
            ..
        } => EngineEvent::Advance(1).into(),

        KeyEvent {
            code: KeyCode::Enter | KeyCode::Char('t'),
            ..
        } => AppEvent::ToggleAtCursor.into(),

        // movements
        KeyEvent {
            code: KeyCode::Char('h') | KeyCode::Left,
            ..
        } => AppEvent::MoveCursor(Direction::Left).into(),
        KeyEvent {
            code: KeyCode::Char('j') | KeyCode::Down,
            ..
        } => AppEvent::MoveCursor(Direction::Down).into(),
        KeyEvent {
            code: KeyCode::Char('k') | KeyCode::Up,
            ..
        } => AppEvent::MoveCursor(Direction::Up).into(),
        KeyEvent {
            code: KeyCode::Char('l') | KeyCode::Right,
            ..
        } => AppEvent::MoveCursor(Direction::Right).into(),

        _ => return None,
    };

    Some(event)
}

#[cfg(test)]
mod test {
    use super::*;

    fn key(code: KeyCode) -> CrossTermEvent {
        CrossTermEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn keys() {
        let cases: [(CrossTermEvent, Option<Event>); 8] = [
            (key(KeyCode::Char('q')), Some(AppEvent::Exit.into())),
            (key(KeyCode::Char(' ')), Some(EngineEvent::PlayPause.into())),
            (key(KeyCode::Char('r')), Some(EngineEvent::Reset.into())),
            (key(KeyCode::Char('n')), Some(EngineEvent::Advance(1).into())),
            (key(KeyCode::Enter), Some(AppEvent::ToggleAtCursor.into())),
            (
                key(KeyCode::Char('k')),
                Some(AppEvent::MoveCursor(Direction::Up).into()),
            ),
            (
                key(KeyCode::Right),
                Some(AppEvent::MoveCursor(Direction::Right).into()),
            ),
            (key(KeyCode::Char('z')), None),
        ];

        for (event, expected) in cases {
            assert_eq!(convert_event(event.clone()), expected, "{event:?}");
        }
    }

    #[test]
    fn ctrl_c_exits() {
        let event = CrossTermEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));

        assert_eq!(convert_event(event), Some(AppEvent::Exit.into()));
    }

    #[test]
    fn left_click() {
        let click = |kind| {
            CrossTermEvent::Mouse(MouseEvent {
                kind,
                column: 7,
                row: 2,
                modifiers: KeyModifiers::NONE,
            })
        };

        assert_eq!(
            convert_event(click(MouseEventKind::Down(MouseButton::Left))),
            Some(AppEvent::Click { column: 7, row: 2 }.into())
        );
        assert_eq!(
            convert_event(click(MouseEventKind::Down(MouseButton::Right))),
            None
        );
    }

    #[test]
    fn motion_and_releases_map_to_nothing() {
        let mouse = |kind| {
            CrossTermEvent::Mouse(MouseEvent {
                kind,
                column: 3,
                row: 1,
                modifiers: KeyModifiers::NONE,
            })
        };
        let release = CrossTermEvent::Key(KeyEvent::new_with_kind(
            KeyCode::Char(' '),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ));

        assert_eq!(convert_event(mouse(MouseEventKind::Moved)), None);
        assert_eq!(convert_event(mouse(MouseEventKind::Drag(MouseButton::Left))), None);
        assert_eq!(convert_event(mouse(MouseEventKind::Up(MouseButton::Left))), None);
        assert_eq!(convert_event(release), None);
    }
}
