//! Built-in demo sources.
//!
//! Two canned meeting lists that answer after 3 and 5 seconds, useful for
//! seeing progressive loading without a live endpoint.

use std::sync::Arc;
use std::time::Duration;

use mn_core::{ListNotesResponse, Note, NoteId, NoteList, PageInfo, SourceName, ValidationError};

use crate::{FixtureSource, NoteSource};

const DEMO_PAGE: PageInfo = PageInfo {
    page_now: 1,
    page_size: 3000,
    page_total: 7,
    total_num: 20000,
};

fn note(id: &str, title: &str, duration: i64, create_time: &str) -> Result<Note, ValidationError> {
    Ok(Note {
        id: NoteId::new(id)?,
        title: title.to_string(),
        duration,
        create_time: create_time.to_string(),
    })
}

fn response(list: Vec<Note>) -> ListNotesResponse {
    ListNotesResponse::success(NoteList {
        list,
        page: Some(DEMO_PAGE),
    })
}

/// The `meeting-a` and `meeting-b` demo sources, in display order.
pub fn sources() -> Result<Vec<Arc<dyn NoteSource>>, ValidationError> {
    let meeting_a = FixtureSource::from_response(
        SourceName::new("meeting-a")?,
        response(vec![
            note(
                "6619deafdabc4707a470c3bb17e8b57e",
                "Police source protect",
                4593,
                "2022-02-28 19:01:19",
            )?,
            note(
                "6619deafdabc4707a470c3bb17e8b57f",
                "asd qwe",
                6000,
                "2022-02-28 20:01:19",
            )?,
        ]),
    )
    .with_delay(Duration::from_secs(3));

    let meeting_b = FixtureSource::from_response(
        SourceName::new("meeting-b")?,
        response(vec![note(
            "dc1e4811d8594f0bad6003307dd170b9",
            "Player but movie major put idea",
            1495,
            "2022-02-17 11:41:22",
        )?]),
    )
    .with_delay(Duration::from_secs(5));

    let sources: Vec<Arc<dyn NoteSource>> = vec![Arc::new(meeting_a), Arc::new(meeting_b)];
    Ok(sources)
}
