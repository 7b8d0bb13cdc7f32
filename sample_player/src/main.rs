use nih_plug::prelude::*;
use sample_player::SamplePlayer;

fn main() {
    nih_export_standalone::<SamplePlayer>();
}
