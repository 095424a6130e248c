use std::cell::RefCell;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{ConfigError, DynBoxWrite, DynError};

lazy_static! {
    // Matches the counter placeholder: %d or %0Nd for a single digit N,
    // e.g. %03d. Same pattern decides fan-out for the resolver and for the
    // schema consistency check in the exporter.
    static ref COUNTER_PLACEHOLDER: Regex =
        Regex::new(r"%(0\d)?d").expect("BUG: invalid counter placeholder regex");
}

/// True if the template routes each result set to its own file.
pub fn creates_multiple_files(template: &str) -> bool {
    COUNTER_PLACEHOLDER.is_match(template)
}

/// Rejects templates with more than one counter placeholder. Zero or one
/// placeholder is fine.
pub fn validate_template(template: &str) -> Result<(), ConfigError> {
    if COUNTER_PLACEHOLDER.find_iter(template).count() > 1 {
        return Err(ConfigError::new(
            "The output template must contain at most one %d placeholder",
        ));
    }
    Ok(())
}

// Substitutes the result set number into the placeholder, zero-padded when
// the %0Nd form is used. Must only be called on templates for which
// creates_multiple_files() is true.
fn format_filename(template: &str, index: usize) -> String {
    let caps = COUNTER_PLACEHOLDER
        .captures(template)
        .expect("BUG: format_filename called on a template without a placeholder");
    let m = caps.get(0).expect("BUG: capture group 0 is the whole match");
    let width = caps
        .get(1)
        .map(|w| w.as_str().parse::<usize>().unwrap_or(0))
        .unwrap_or(0);
    let num = format!("{:0width$}", index, width = width);
    format!("{}{}{}", &template[..m.start()], num, &template[m.end()..])
}

pub type SharedStream = Rc<RefCell<DynBoxWrite>>;

/// A writable destination for one result set's CSV output. Stream sinks wrap
/// a shared stream that outlives the sink (stdout, or the single file of a
/// non-templated output) and close() only flushes it. File sinks own their
/// file and release it when the sink is dropped after close().
pub enum Sink {
    Stream(SharedStream),
    File(BufWriter<fs::File>),
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Stream(s) => s.borrow_mut().write(buf),
            Sink::File(f) => f.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Stream(s) => s.borrow_mut().flush(),
            Sink::File(f) => f.flush(),
        }
    }
}

impl Sink {
    pub fn close(&mut self) -> io::Result<()> {
        // Never closes the underlying stream for the Stream variant, so
        // stdout stays usable for the rest of the process.
        self.flush()
    }
}

pub struct SinkResolver {
    template: String,
    stdout: SharedStream,
    static_file: Option<SharedStream>,
}

impl SinkResolver {
    pub fn new(template: &str, stdout: DynBoxWrite) -> Self {
        Self {
            template: template.to_string(),
            stdout: Rc::new(RefCell::new(stdout)),
            static_file: None,
        }
    }

    pub fn creates_multiple_files(&self) -> bool {
        creates_multiple_files(&self.template)
    }

    /// Produces the sink for the result set with the given zero-based number.
    /// An empty template resolves to the stdout stream, a template with a
    /// counter placeholder to a fresh file per call, and any other template
    /// to a single file created on the first call and shared afterwards.
    pub fn resolve(&mut self, index: usize) -> Result<Sink, DynError> {
        if self.template.is_empty() {
            return Ok(Sink::Stream(Rc::clone(&self.stdout)));
        }
        if creates_multiple_files(&self.template) {
            let filename = format_filename(&self.template, index);
            if filename.is_empty() {
                return Err(Box::new(ConfigError::new(
                    "The output template resolves to an empty filename",
                )));
            }
            return Ok(Sink::File(BufWriter::new(fs::File::create(filename)?)));
        }
        let shared = match &self.static_file {
            Some(s) => Rc::clone(s),
            None => {
                let wr: DynBoxWrite = Box::new(BufWriter::new(fs::File::create(&self.template)?));
                let s: SharedStream = Rc::new(RefCell::new(wr));
                self.static_file = Some(Rc::clone(&s));
                s
            }
        };
        Ok(Sink::Stream(shared))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn placeholder_detection() {
        assert!(creates_multiple_files("out-%d.csv"));
        assert!(creates_multiple_files("out-%03d.csv"));
        assert!(creates_multiple_files("%d"));
        assert!(!creates_multiple_files(""));
        assert!(!creates_multiple_files("out.csv"));
        assert!(!creates_multiple_files("100%discount.csv"));
        // the padding width is a single digit
        assert!(!creates_multiple_files("out-%0d.csv"));
    }

    #[test]
    fn validate_template_rejects_multiple_placeholders() {
        assert!(validate_template("").is_ok());
        assert!(validate_template("out.csv").is_ok());
        assert!(validate_template("out-%d.csv").is_ok());
        assert!(validate_template("out-%d-%d.csv").is_err());
        assert!(validate_template("out-%d-%03d.csv").is_err());
    }

    #[test]
    fn format_filename_works() {
        assert_eq!(format_filename("out-%d.csv", 0), "out-0.csv");
        assert_eq!(format_filename("out-%d.csv", 12), "out-12.csv");
        assert_eq!(format_filename("out-%03d.csv", 0), "out-000.csv");
        assert_eq!(format_filename("out-%03d.csv", 7), "out-007.csv");
        assert_eq!(format_filename("out-%03d.csv", 42), "out-042.csv");
        // wider than the padding: no truncation
        assert_eq!(format_filename("out-%03d.csv", 1234), "out-1234.csv");
        assert_eq!(format_filename("%d", 5), "5");
    }

    #[test]
    fn indexed_template_resolves_to_distinct_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("out-%02d.csv");
        let mut resolver = SinkResolver::new(template.to_str().unwrap(), Box::new(Vec::new()));
        for i in 0..3 {
            let mut sink = resolver.resolve(i).unwrap();
            sink.write_all(format!("set {}\n", i).as_bytes()).unwrap();
            sink.close().unwrap();
        }
        for i in 0..3 {
            let content =
                std::fs::read_to_string(dir.path().join(format!("out-0{}.csv", i))).unwrap();
            assert_eq!(content, format!("set {}\n", i));
        }
    }

    #[test]
    fn static_template_resolves_to_one_shared_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut resolver = SinkResolver::new(path.to_str().unwrap(), Box::new(Vec::new()));
        for i in 0..2 {
            let mut sink = resolver.resolve(i).unwrap();
            sink.write_all(format!("set {}\n", i).as_bytes()).unwrap();
            sink.close().unwrap();
        }
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "set 0\nset 1\n");
    }

    #[test]
    fn empty_template_resolves_to_the_injected_stream() {
        let captured = crate::output::tests::SharedBuf::default();
        let mut resolver = SinkResolver::new("", Box::new(captured.clone()));
        for i in 0..2 {
            let mut sink = resolver.resolve(i).unwrap();
            sink.write_all(format!("set {}\n", i).as_bytes()).unwrap();
            sink.close().unwrap();
        }
        assert_eq!(captured.contents(), "set 0\nset 1\n");
    }

    #[test]
    fn file_creation_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-subdir/out.csv");
        let mut resolver = SinkResolver::new(path.to_str().unwrap(), Box::new(Vec::new()));
        assert!(resolver.resolve(0).is_err());
    }
}
