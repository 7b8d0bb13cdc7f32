/// A sounding note identified by MIDI note number and channel.
#[derive(Hash, PartialEq, Eq, Clone, Copy, Default, Debug)]
pub struct Note {
    pub note: u8,
    pub channel: u8,
}

impl Note {
    pub fn new(note: u8, channel: u8) -> Self {
        debug_assert!(channel <= 15);
        Self { note, channel }
    }
}
