use std::{
    collections::BTreeMap,
    io::{Read, Write},
    sync::Arc,
    time::Instant,
};

use tracing::{debug, error, info, instrument, trace, warn};

use crate::{
    context::SkdContext,
    error::{IOError, Result, SkdError, StateError, SyntaxError},
    holder::DatabaseHolder,
    parser::{
        config::{BlankLines, ParserConfig, ParsingContext},
        line::{self, Declaration, Line, LineKind},
        properties::parse_properties,
    },
    service::SkdService,
    structure::{Database, DoctypeDeclaration, Structure, Tag, VersionDeclaration},
};

/// Legacy versions accepted without a warning
const LEGACY_SILENT: &[&str] = &["0.1"];
/// Legacy versions accepted with a deprecation warning
const LEGACY_DEPRECATED: &[&str] = &["0.2", "0.2.1"];

/// Indentation-driven SKD parser bound to one source
///
/// The source is read once by [`SkdParser::init`]; every [`SkdParser::read`]
/// scans it again from a clean state.
#[derive(Debug)]
pub struct SkdParser {
    context: Arc<SkdContext>,
    holder: Box<dyn DatabaseHolder>,
    config: ParserConfig,
    source: Option<String>,
}

impl SkdParser {
    /// Parser configured by the context's active service
    pub fn new(context: Arc<SkdContext>, holder: Box<dyn DatabaseHolder>) -> Result<Self> {
        let config = context.service()?.parser_config();
        Ok(Self::with_config(context, holder, config))
    }

    pub fn with_config(
        context: Arc<SkdContext>,
        holder: Box<dyn DatabaseHolder>,
        config: ParserConfig,
    ) -> Self {
        Self {
            context,
            holder,
            config,
            source: None,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.source.is_some()
    }

    pub fn database_name(&self) -> Option<String> {
        self.holder.display_name()
    }

    /// Loads the source; `force` skips the holder's acceptance check
    pub fn init(&mut self, force: bool) -> Result<()> {
        if self.is_initialized() {
            return Err(SkdError::state(StateError::AlreadyInitialized));
        }

        if !self.holder.default_acceptable() {
            if !force {
                return Err(SkdError::state(StateError::SourceRejected(
                    self.display_name(),
                )));
            }
            warn!("Forcing initialization of {}", self.display_name());
            warn!("The source is not accepted by default, parsing may misbehave");
        }

        let mut source = String::new();
        self.holder
            .reader()?
            .read_to_string(&mut source)
            .map_err(|e| SkdError::io(IOError::ReadError(e.to_string())))?;
        self.config.validate_size(source.len())?;

        debug!("Initialized parser for {} ({} bytes)", self.display_name(), source.len());
        self.source = Some(source);
        Ok(())
    }

    /// Parses the source into a database, initializing the parser first if needed
    ///
    /// Any failure during the scan is reported as
    /// [`SyntaxError::InvalidDatabaseSyntax`] with the original error as source.
    #[instrument(skip(self), fields(database = %self.display_name()))]
    pub fn read(&mut self) -> Result<Database> {
        if !self.is_initialized() {
            self.init(false)?;
        }

        info!("Reading database");
        let start = Instant::now();

        let source = self.source.as_deref().unwrap_or_default();
        let service = self.context.service()?;
        let scanner = Scanner::new(&self.context, service, &self.config);

        match scanner.scan(source) {
            Ok(database) => {
                info!("Parse completed in {:?}", start.elapsed());
                Ok(database)
            }
            Err(e) => {
                error!("Unable to parse database: {}", e);
                Err(SkdError::syntax(SyntaxError::InvalidDatabaseSyntax)
                    .with_context(self.display_name())
                    .with_source(e))
            }
        }
    }

    /// Serializes `database` into `holder`; `Ok(false)` if the holder is not writable
    #[instrument(skip(self, database, holder), fields(destination = ?holder.display_name()))]
    pub fn write(&self, database: &Database, holder: &dyn DatabaseHolder) -> Result<bool> {
        if !holder.is_writable() {
            debug!("Destination is not writable");
            return Ok(false);
        }

        info!(
            "Writing database {} ({}) to {}",
            self.display_name(),
            database.variant(),
            holder.display_name().unwrap_or_else(|| "unnamed holder".to_string())
        );
        let start = Instant::now();

        let Some(mut writer) = holder.writer()? else {
            return Err(SkdError::state(StateError::NotWritable(
                holder.display_name().unwrap_or_default(),
            )));
        };
        let write_error = |e: std::io::Error| SkdError::io(IOError::WriteError(e.to_string()));
        writer
            .write_all(database.to_string().as_bytes())
            .map_err(write_error)?;
        writer.flush().map_err(write_error)?;

        info!("Write completed in {:?}", start.elapsed());
        Ok(true)
    }

    /// Writes `database` back to the source this parser reads from
    pub fn write_back(&self, database: &Database) -> Result<bool> {
        self.write(database, self.holder.as_ref())
    }

    fn display_name(&self) -> String {
        self.holder
            .display_name()
            .unwrap_or_else(|| "unnamed database".to_string())
    }
}

/// A level's last tag: still open, or closed and already attached to its parent
#[derive(Debug)]
enum Slot {
    Open(Tag),
    Closed(String),
}

/// Per-document scan state
struct Scanner<'p> {
    context: &'p SkdContext,
    service: Arc<dyn SkdService>,
    config: &'p ParserConfig,
    limits: ParsingContext,
    levels: BTreeMap<usize, Slot>,
    structure: Structure,
    doctype: Option<DoctypeDeclaration>,
    version: Option<VersionDeclaration>,
}

impl<'p> Scanner<'p> {
    fn new(context: &'p SkdContext, service: Arc<dyn SkdService>, config: &'p ParserConfig) -> Self {
        let structure = service.structure();
        Self {
            context,
            service,
            config,
            limits: ParsingContext::new(),
            levels: BTreeMap::new(),
            structure,
            doctype: None,
            version: None,
        }
    }

    fn scan(mut self, source: &str) -> Result<Database> {
        for (index, raw) in source.lines().enumerate() {
            let line = Line::classify(index + 1, raw);
            self.parse_line(raw, &line)
                .map_err(|e| e.locate(line.number, line.column()))?;
        }
        self.finish()
    }

    fn parse_line(&mut self, raw: &str, line: &Line<'_>) -> Result<()> {
        self.limits.add_size(raw.len() + 1, self.config)?;
        self.limits.enter_level(line.indent, self.config)?;

        match line.kind {
            LineKind::Declaration(markup) => {
                trace!("Found declaration {}", markup);
                let declaration = line::parse_declaration(markup)?;
                self.declare(declaration)
            }
            LineKind::LegacyDeclaration(markup) => self.legacy_declaration(markup),
            LineKind::VoidTag(markup) => {
                trace!("Found void tag {}", markup);
                self.void_tag(line.indent, markup)
            }
            LineKind::ClosingTag(markup) => {
                trace!("Found closing tag {}", markup);
                self.closing_tag(line.indent, markup)
            }
            LineKind::OpeningTag(markup) => {
                trace!("Found opening tag {}", markup);
                self.opening_tag(line.indent, markup)
            }
            LineKind::Blank => {
                self.blank();
                Ok(())
            }
            LineKind::Content(text) => self.content(line.indent, text),
        }
    }

    fn declare(&mut self, declaration: Declaration) -> Result<()> {
        let name = declaration.name();
        match declaration {
            Declaration::Doctype(stylesheet) => {
                if self.doctype.is_some() {
                    return Err(duplicate(name));
                }
                debug!("Doctype {}", stylesheet);
                let doctype = self.service.doctype(&stylesheet);
                if !doctype.is_valid(&self.context.doctypes()) {
                    if self.config.strict_doctypes {
                        return Err(SkdError::syntax(SyntaxError::UnresolvedDoctype(
                            stylesheet,
                        )));
                    }
                    warn!(
                        "No doctype provider for stylesheet {}, accepting it anyway",
                        stylesheet
                    );
                }
                self.doctype = Some(doctype);
            }
            Declaration::Version(version) => {
                if self.version.is_some() {
                    return Err(duplicate(name));
                }
                debug!("Version {}", version);
                self.version = Some(self.service.version(&version));
            }
        }
        Ok(())
    }

    fn legacy_declaration(&mut self, markup: &str) -> Result<()> {
        let unsupported =
            || SkdError::syntax(SyntaxError::UnsupportedLegacyDeclaration(markup.to_string()));
        if !self.config.legacy_declarations {
            return Err(unsupported());
        }

        let declaration = line::parse_declaration(&line::modernize_legacy(markup))?;
        let Declaration::Version(version) = &declaration else {
            return Err(unsupported());
        };
        if LEGACY_DEPRECATED.contains(&version.as_str()) {
            warn!(
                "Legacy declaration {} is deprecated, use <!SKD version=\"{}\">",
                markup, version
            );
        } else if !LEGACY_SILENT.contains(&version.as_str()) {
            return Err(unsupported());
        }
        self.declare(declaration)
    }

    fn opening_tag(&mut self, indent: usize, markup: &str) -> Result<()> {
        self.require_parent(indent)?;
        self.clear_from(indent)?;

        let head = line::split_tag(markup, false)?;
        let tag = self.build_tag(head.name, head.properties)?;
        let tag = self.service.tag_callback(tag)?;
        self.levels.insert(indent, Slot::Open(tag));
        Ok(())
    }

    /// Void tags attach at once and leave the slots of their own level untouched
    fn void_tag(&mut self, indent: usize, markup: &str) -> Result<()> {
        self.require_parent(indent)?;

        let head = line::split_tag(markup, true)?;
        let mut tag = self.build_tag(head.name, head.properties)?;
        tag.set_void(true)?;
        tag.close();
        let tag = self.service.tag_callback(tag)?;
        let tag = self.context.refine_tag(tag)?;
        self.attach(indent, tag)
    }

    fn closing_tag(&mut self, indent: usize, markup: &str) -> Result<()> {
        let name = line::closing_name(markup)?;
        let not_opened = || SkdError::syntax(SyntaxError::ClosedWithoutOpening(name.to_string()));

        match self.levels.get(&indent) {
            Some(Slot::Open(tag)) if tag.name() == name => {}
            _ => return Err(not_opened()),
        }
        if let Some(open) = self.first_open_from(indent + 1) {
            return Err(SkdError::syntax(SyntaxError::UnclosedTag(open)));
        }
        self.levels.retain(|level, _| *level <= indent);

        let Some(Slot::Open(mut tag)) = self.levels.remove(&indent) else {
            return Err(not_opened());
        };
        tag.close();
        let tag = self.context.refine_tag(tag)?;

        self.levels.insert(indent, Slot::Closed(name.to_string()));
        self.attach(indent, tag)
    }

    fn content(&mut self, indent: usize, text: &str) -> Result<()> {
        if indent == 0 {
            return Err(SkdError::syntax(SyntaxError::ContentWithoutParent));
        }
        if let Some(open) = self.first_open_from(indent) {
            return Err(SkdError::syntax(SyntaxError::UnclosedTag(open)));
        }

        match self.levels.get_mut(&(indent - 1)) {
            Some(Slot::Open(tag)) => {
                let length = tag.content().map_or(0, |c| c.len() + 1) + text.len();
                self.config.validate_string_length(length)?;
                tag.append_content(text)
            }
            Some(Slot::Closed(_)) => Err(SkdError::syntax(SyntaxError::ParentClosed)),
            None => Err(SkdError::syntax(SyntaxError::NoParent)),
        }
    }

    fn blank(&mut self) {
        if self.config.blank_lines == BlankLines::Preserve && self.first_open_from(0).is_none() {
            self.structure.push_placeholder();
        }
    }

    fn build_tag(&self, name: &str, properties: &str) -> Result<Tag> {
        let mut tag = self.service.tag(name)?;
        let pairs = parse_properties(properties)?;
        self.config.validate_properties(pairs.len())?;

        for (key, value) in pairs {
            self.config.validate_string(&value)?;
            let property = self.service.property(&key, Some(value))?;
            let property = self.service.property_callback(property)?;
            let property = self.context.refine_property(property)?;
            if !tag.add_property(property)? {
                warn!("Dropping duplicate property {} on tag {}", key, name);
            }
        }
        Ok(tag)
    }

    /// Attaches a finished tag to its parent, or to the structure at the top level
    fn attach(&mut self, indent: usize, tag: Tag) -> Result<()> {
        if indent == 0 {
            self.structure.push(tag);
            return Ok(());
        }

        let level = indent - 1;
        let mut parent = match self.levels.remove(&level) {
            Some(Slot::Open(parent)) => parent,
            Some(closed @ Slot::Closed(_)) => {
                self.levels.insert(level, closed);
                return Err(SkdError::syntax(SyntaxError::ParentClosed));
            }
            None => return Err(SkdError::syntax(SyntaxError::NoParent)),
        };
        parent.add_child(tag)?;
        let parent = self.service.tag_callback(parent)?;
        let parent = self.context.refine_tag(parent)?;
        self.levels.insert(level, Slot::Open(parent));
        Ok(())
    }

    fn require_parent(&self, indent: usize) -> Result<()> {
        if indent == 0 {
            return Ok(());
        }
        match self.levels.get(&(indent - 1)) {
            Some(Slot::Open(_)) => Ok(()),
            Some(Slot::Closed(_)) => Err(SkdError::syntax(SyntaxError::ParentClosed)),
            None => Err(SkdError::syntax(SyntaxError::NoParent)),
        }
    }

    /// Forgets closed tags at `indent` and deeper; fails if one is still open
    fn clear_from(&mut self, indent: usize) -> Result<()> {
        if let Some(open) = self.first_open_from(indent) {
            return Err(SkdError::syntax(SyntaxError::UnclosedTag(open)));
        }
        self.levels.retain(|level, _| *level < indent);
        Ok(())
    }

    fn first_open_from(&self, indent: usize) -> Option<String> {
        self.levels.range(indent..).find_map(|(_, slot)| match slot {
            Slot::Open(tag) => Some(tag.name().to_string()),
            Slot::Closed(_) => None,
        })
    }

    fn finish(self) -> Result<Database> {
        if let Some(open) = self.first_open_from(0) {
            return Err(SkdError::syntax(SyntaxError::UnclosedTag(open)));
        }
        let doctype = self.doctype.ok_or_else(|| {
            SkdError::syntax(SyntaxError::MissingDeclaration("DOCTYPE".to_string()))
        })?;
        let version = self.version.ok_or_else(|| {
            SkdError::syntax(SyntaxError::MissingDeclaration("SKD".to_string()))
        })?;

        debug!(
            "Assembling database with {} top-level tags",
            self.structure.non_placeholder_len()
        );
        let database = self.service.database(self.structure, doctype, version);
        let database = self.service.database_callback(database)?;
        self.context.refine_database(database)
    }
}

fn duplicate(name: &str) -> SkdError {
    SkdError::syntax(SyntaxError::DuplicateDeclaration(name.to_string()))
}
