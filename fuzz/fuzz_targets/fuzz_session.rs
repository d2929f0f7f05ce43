#![no_main]

use crisis_survival_client::{LinkEvent, SessionMachine, SessionSettings, UserIntent};
use libfuzzer_sys::fuzz_target;

// Each input line is either a server message (JSON) or a one-byte intent code.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let mut machine = SessionMachine::new(SessionSettings::new("ws://fuzz"));
    let mut connection = None;

    for line in text.lines() {
        let intent = match line {
            "s" => Some(UserIntent::StartSolo),
            "m" => Some(UserIntent::StartMatching),
            "c" => Some(UserIntent::CancelMatching),
            "x" => Some(UserIntent::RequestExit),
            "y" => Some(UserIntent::ConfirmExit),
            "p" => Some(UserIntent::PlayAgain),
            _ => None,
        };
        let actions = if let Some(intent) = intent {
            machine.handle_intent(intent)
        } else if line == "o" {
            match connection {
                Some(id) => machine.handle_link(LinkEvent::Opened(id)),
                None => Vec::new(),
            }
        } else if line == "t" {
            machine.handle_link(LinkEvent::CountdownTick)
        } else if let Ok(Some(event)) = crisis_survival_client::codec::decode(line) {
            machine.handle_event(event)
        } else {
            Vec::new()
        };
        for action in actions {
            if let crisis_survival_client::Action::Connect { connection: id, .. } = action {
                connection = Some(id);
            }
        }
        assert_eq!(
            machine.view().game.is_some(),
            machine.view().screen == crisis_survival_client::Screen::Game
        );
    }
});
