//! List command: fetch every source, group by day, apply folds, render.
//!
//! With `--progress` the day list is rebuilt and rendered for every snapshot,
//! so days appear as their sources land. Fold toggles are applied once, when
//! their day first appears, and hold across later rebuilds.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use chrono::TimeZone;
use mn_core::{FoldStateStore, FoldedSegment, Note, Segment, SegmentBuilder};
use mn_fetch::{Aggregator, NoteSource, Snapshot, SourceState};
use serde::Serialize;

/// Options for a list run.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub json: bool,
    /// Day labels to toggle, applied in order.
    pub toggles: Vec<String>,
    pub progress: bool,
}

pub async fn run<W, Tz>(
    writer: &mut W,
    sources: Vec<Arc<dyn NoteSource>>,
    builder: &SegmentBuilder<Tz>,
    options: &ListOptions,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let aggregator = Aggregator::start(sources);
    let mut days = DayList::new(builder, &options.toggles);

    if options.progress {
        let mut rx = aggregator.subscribe();
        loop {
            let snapshot = rx.borrow_and_update().clone();
            if !options.json {
                writeln!(writer, "{}", progress_line(&snapshot))?;
            }
            days.render(writer, &snapshot, options.json)?;
            if !snapshot.loading {
                break;
            }
            rx.changed().await?;
        }
    } else {
        let snapshot = aggregator.settled().await;
        days.render(writer, &snapshot, options.json)?;
    }

    for label in &days.pending {
        tracing::warn!(day = %label, "no day matches toggle");
    }
    Ok(())
}

/// Day segments rebuilt from each snapshot, with fold overrides that outlive
/// any single build.
struct DayList<'b, Tz: TimeZone> {
    builder: &'b SegmentBuilder<Tz>,
    folds: FoldStateStore,
    /// Toggles whose day has not shown up yet, in request order.
    pending: Vec<String>,
}

impl<'b, Tz> DayList<'b, Tz>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    fn new(builder: &'b SegmentBuilder<Tz>, toggles: &[String]) -> Self {
        Self {
            builder,
            folds: FoldStateStore::new(),
            pending: toggles.to_vec(),
        }
    }

    /// Rebuilds segments from `notes` and applies toggles for newly seen days.
    fn refresh(&mut self, notes: &[Note]) -> Vec<Segment> {
        let segments = self.builder.build(notes);
        self.pending
            .retain(|label| match segments.iter().find(|s| s.day_label == *label) {
                Some(segment) => {
                    self.folds.toggle(segment);
                    false
                }
                None => true,
            });
        segments
    }

    fn render<W: Write>(&mut self, writer: &mut W, snapshot: &Snapshot, json: bool) -> Result<()> {
        let segments = self.refresh(&snapshot.notes);
        let view = self.folds.apply(&segments);
        if json {
            write_json(writer, snapshot, &view)
        } else {
            write_text(writer, snapshot, &view)
        }
    }
}

fn progress_line(snapshot: &Snapshot) -> String {
    let settled = snapshot
        .sources
        .iter()
        .filter(|s| s.state != SourceState::Loading)
        .count();
    format!(
        "{settled}/{} sources settled, {}",
        snapshot.sources.len(),
        note_count(snapshot.notes.len())
    )
}

fn note_count(count: usize) -> String {
    if count == 1 {
        "1 note".to_string()
    } else {
        format!("{count} notes")
    }
}

fn write_text<W: Write>(
    writer: &mut W,
    snapshot: &Snapshot,
    view: &[FoldedSegment<'_>],
) -> Result<()> {
    writeln!(writer, "Meeting Notes")?;
    if view.is_empty() {
        let empty = if snapshot.loading { "Loading..." } else { "No notes." };
        writeln!(writer, "{empty}")?;
    }

    for day in view {
        let segment = day.segment;
        if day.folded {
            writeln!(
                writer,
                "▸ {} ({})",
                segment.day_label,
                note_count(segment.notes.len())
            )?;
            continue;
        }
        writeln!(writer, "▾ {}", segment.day_label)?;
        for note in &segment.notes {
            writeln!(writer, "    {}  {}", note.title(), note.time_range_label)?;
        }
    }

    for source in &snapshot.sources {
        if source.state == SourceState::Failed {
            writeln!(writer, "! {} failed to load", source.name)?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ListOutput<'a> {
    loading: bool,
    sources: Vec<SourceReport<'a>>,
    segments: &'a [FoldedSegment<'a>],
}

#[derive(Serialize)]
struct SourceReport<'a> {
    name: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<usize>,
}

fn write_json<W: Write>(
    writer: &mut W,
    snapshot: &Snapshot,
    view: &[FoldedSegment<'_>],
) -> Result<()> {
    let sources = snapshot
        .sources
        .iter()
        .map(|source| {
            let (status, notes) = match source.state {
                SourceState::Loading => ("loading", None),
                SourceState::Loaded(count) => ("loaded", Some(count)),
                SourceState::Failed => ("failed", None),
            };
            SourceReport {
                name: source.name.as_str(),
                status,
                notes,
            }
        })
        .collect();
    let output = ListOutput {
        loading: snapshot.loading,
        sources,
        segments: view,
    };
    serde_json::to_writer_pretty(&mut *writer, &output)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use chrono::Utc;
    use insta::assert_snapshot;
    use mn_core::{ListNotesResponse, NoteId, NoteList, SourceName, TimeFormatter};
    use mn_fetch::FixtureSource;

    fn note(id: &str, title: &str, duration: i64, create_time: &str) -> Note {
        Note {
            id: NoteId::new(id).unwrap(),
            title: title.to_string(),
            duration,
            create_time: create_time.to_string(),
        }
    }

    fn source(name: &str, response: ListNotesResponse) -> Arc<dyn NoteSource> {
        Arc::new(FixtureSource::from_response(
            SourceName::new(name).unwrap(),
            response,
        ))
    }

    fn meeting_sources() -> Vec<Arc<dyn NoteSource>> {
        vec![
            source(
                "meeting-a",
                ListNotesResponse::success(NoteList {
                    list: vec![
                        note("a1", "Police source protect", 4593, "2022-02-28 19:01:19"),
                        note("a2", "asd qwe", 6000, "2022-02-28 20:01:19"),
                    ],
                    page: None,
                }),
            ),
            source(
                "meeting-b",
                ListNotesResponse::success(NoteList {
                    list: vec![note(
                        "b1",
                        "Player but movie major put idea",
                        1495,
                        "2022-02-17 11:41:22",
                    )],
                    page: None,
                }),
            ),
        ]
    }

    fn builder() -> SegmentBuilder<Utc> {
        SegmentBuilder::new(TimeFormatter::new(Utc))
    }

    async fn render(sources: Vec<Arc<dyn NoteSource>>, options: &ListOptions) -> String {
        let mut output = Vec::new();
        run(&mut output, sources, &builder(), options).await.unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn list_groups_notes_by_day() {
        let output = render(meeting_sources(), &ListOptions::default()).await;
        assert_snapshot!(output, @r"
Meeting Notes
▾ Monday, Feb 28
    Police source protect  07:01 pm - 08:17 pm
    asd qwe  08:01 pm - 09:41 pm
▾ Thursday, Feb 17
    Player but movie major put idea  11:41 am - 12:06 pm
");
    }

    #[tokio::test]
    async fn toggled_day_is_folded() {
        let options = ListOptions {
            toggles: vec!["Thursday, Feb 17".to_string()],
            ..ListOptions::default()
        };
        let output = render(meeting_sources(), &options).await;
        assert!(output.contains("▸ Thursday, Feb 17 (1 note)"));
        assert!(!output.contains("Player but movie major put idea"));
        assert!(output.contains("▾ Monday, Feb 28"));
    }

    #[tokio::test]
    async fn toggling_twice_restores_expanded() {
        let options = ListOptions {
            toggles: vec!["Monday, Feb 28".to_string(), "Monday, Feb 28".to_string()],
            ..ListOptions::default()
        };
        let output = render(meeting_sources(), &options).await;
        assert!(output.contains("▾ Monday, Feb 28"));
        assert!(output.contains("asd qwe"));
    }

    #[tokio::test]
    async fn all_sources_failing_renders_empty_list() {
        let sources = vec![
            source("meeting-a", ListNotesResponse::failure(-1, "down")),
            source("meeting-b", ListNotesResponse::failure(-1, "down")),
        ];
        let output = render(sources, &ListOptions::default()).await;
        assert_snapshot!(output, @r"
Meeting Notes
No notes.
! meeting-a failed to load
! meeting-b failed to load
");
    }

    #[tokio::test]
    async fn json_output_includes_fold_and_labels() {
        let options = ListOptions {
            json: true,
            toggles: vec!["Monday, Feb 28".to_string()],
            ..ListOptions::default()
        };
        let output = render(meeting_sources(), &options).await;
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["loading"], false);
        assert_eq!(json["sources"][0]["status"], "loaded");
        assert_eq!(json["sources"][0]["notes"], 2);

        let segments = json["segments"].as_array().unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0]["day_label"], "Monday, Feb 28");
        assert_eq!(segments[0]["folded"], true);
        assert_eq!(segments[1]["folded"], false);
        assert_eq!(segments[0]["notes"].as_array().unwrap().len(), 2);
        assert_eq!(
            segments[0]["notes"][0]["time_range_label"],
            "07:01 pm - 08:17 pm"
        );
        assert_eq!(segments[0]["notes"][0]["id"], "a1");
    }

    #[tokio::test]
    async fn progress_ends_with_all_sources_settled() {
        let options = ListOptions {
            progress: true,
            ..ListOptions::default()
        };
        let output = render(meeting_sources(), &options).await;
        let progress: Vec<&str> = output
            .lines()
            .filter(|line| line.contains("sources settled"))
            .collect();

        assert!(!progress.is_empty());
        assert_eq!(progress.last(), Some(&"2/2 sources settled, 3 notes"));
        assert!(output.ends_with("    Player but movie major put idea  11:41 am - 12:06 pm\n"));
    }

    fn delayed(name: &str, notes: Vec<Note>, delay_secs: u64) -> Arc<dyn NoteSource> {
        Arc::new(
            FixtureSource::from_response(
                SourceName::new(name).unwrap(),
                ListNotesResponse::success(NoteList {
                    list: notes,
                    page: None,
                }),
            )
            .with_delay(Duration::from_secs(delay_secs)),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_holds_while_days_are_rebuilt() {
        // meeting-b lands first and brings Thursday; meeting-a adds to it later.
        let sources = vec![
            delayed(
                "meeting-a",
                vec![
                    note("a1", "Police source protect", 4593, "2022-02-28 19:01:19"),
                    note("a2", "Late recap", 600, "2022-02-17 15:00:00"),
                ],
                5,
            ),
            delayed(
                "meeting-b",
                vec![note(
                    "b1",
                    "Player but movie major put idea",
                    1495,
                    "2022-02-17 11:41:22",
                )],
                3,
            ),
        ];
        let options = ListOptions {
            toggles: vec!["Thursday, Feb 17".to_string()],
            progress: true,
            ..ListOptions::default()
        };

        let output = render(sources, &options).await;
        assert_snapshot!(output, @r"
0/2 sources settled, 0 notes
Meeting Notes
Loading...
1/2 sources settled, 1 note
Meeting Notes
▸ Thursday, Feb 17 (1 note)
2/2 sources settled, 3 notes
Meeting Notes
▾ Monday, Feb 28
    Police source protect  07:01 pm - 08:17 pm
▸ Thursday, Feb 17 (2 notes)
");
    }

    #[test]
    fn day_list_keeps_fold_across_rebuilds() {
        let builder = builder();
        let toggles = vec!["Monday, Feb 28".to_string(), "Sunday, Jan 01".to_string()];
        let mut days = DayList::new(&builder, &toggles);

        let first = days.refresh(&[note("a1", "first", 60, "2022-02-28 19:01:19")]);
        assert!(days.folds.resolve(&first[0]));
        assert_eq!(days.pending, vec!["Sunday, Jan 01"]);

        let rebuilt = days.refresh(&[
            note("b1", "earlier", 60, "2022-02-17 11:41:22"),
            note("a1", "first", 60, "2022-02-28 19:01:19"),
            note("a2", "second", 60, "2022-02-28 20:01:19"),
        ]);
        assert_eq!(rebuilt[0].day_label, "Monday, Feb 28");
        assert_eq!(rebuilt[0].notes.len(), 2);
        assert!(days.folds.resolve(&rebuilt[0]));
        assert!(!days.folds.resolve(&rebuilt[1]));
    }

    #[test]
    fn note_count_pluralizes() {
        assert_eq!(note_count(1), "1 note");
        assert_eq!(note_count(3), "3 notes");
    }
}
