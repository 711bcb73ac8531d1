use crate::model::Task;

pub(crate) const FIELD_DELIMITER: char = '|';

/// Parse a `number | description | minutes` reply into tasks.
///
/// Lines without the delimiter are chatter and get ignored. Any delimited
/// line that is malformed rejects the whole reply, so callers get either a
/// complete plan or an empty one.
pub fn parse_response(text: &str) -> Vec<Task> {
    let mut tasks = Vec::new();
    for line in text.trim().lines() {
        if !line.contains(FIELD_DELIMITER) {
            continue;
        }
        match parse_line(line, tasks.len() as u32 + 1) {
            Some(task) => tasks.push(task),
            None => return Vec::new(),
        }
    }
    tasks
}

fn parse_line(line: &str, ordinal: u32) -> Option<Task> {
    let parts: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    let [number, description, minutes] = parts.as_slice() else {
        return None;
    };
    number.trim().parse::<i64>().ok()?;
    let minutes = minutes.trim().parse::<i64>().ok()?;
    if minutes <= 0 {
        return None;
    }
    let minutes = u32::try_from(minutes).ok()?;
    Some(Task::new(ordinal, description.trim(), minutes))
}
