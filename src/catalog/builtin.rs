use super::model::{Section, TrackDescriptor};

/// The demo shelf shown when no catalog file or music directory is given.
pub fn demo_tracks() -> Vec<TrackDescriptor> {
    use Section::*;

    vec![
        TrackDescriptor::new("Die with a Smile", "Lady Gaga", "./images/diewithasmile.jpg")
            .with_source("audio/diewithasmile.mp3"),
        TrackDescriptor::new("Gul", "Anuv Jain", "./images/gul.jpg").with_source("audio/gul.mp3"),
        TrackDescriptor::new("Alag Asman", "Anuv Jain", "./images/alagasman.jpg")
            .with_source("audio/alagasman.mp3"),
        TrackDescriptor::new("For a Reason", "Karan Aujla", "./images/forareason.png")
            .with_source("audio/forareason.mp3"),
        TrackDescriptor::new("P-POP CULTURE", "Karan Aujla", "./images/forareason.png")
            .with_source("audio/forareason.mp3")
            .in_section(Album),
        TrackDescriptor::new("JO Tum Mere Ho", "Anuv Jain", "./images/jotum.jpg")
            .with_source("audio/jotum.mp3")
            .in_section(Album),
        TrackDescriptor::new("Mismatched", "Anurag Saikia", "./images/mis.jpg")
            .with_source("audio/mismatched.mp3")
            .in_section(Album),
        TrackDescriptor::new("Yeh Jawaani hai Deewani", "Pritam", "./images/yjhd.jpg")
            .with_source("audio/yjhd.mp3")
            .in_section(Album),
        TrackDescriptor::new("Gul", "Anuv jain", "./images/gul.jpg").in_section(Row),
        TrackDescriptor::new("Perfect", "Ed Sheeran", "./images/perfect.jpg").in_section(Row),
    ]
}
