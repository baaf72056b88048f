//! Gathers the parameters for one run, from the command line first and then by asking.
//!
//! Every field goes through the same steps: a command-line value is validated
//! and used; failing that, silent mode applies the field's default (or gives
//! up if the field is required); otherwise the operator is asked until the
//! answer validates. An invalid command-line value is fatal in silent mode and
//! falls through to the prompt otherwise.
use crate::catalog::Catalog;
use crate::cli::Cli;
use crate::error::{SchemaLookupError, SessionError, ValidationError};
use crate::filters::{FilterParser, FilterSpec};
use crate::geo::{Aoi, GeometryValidator};
use crate::params::{InputValue, ParamValue, ParameterStore};
use crate::prompt::{Prompter, Question};
use crate::validate::{
    validate_collection, validate_dates, validate_overlap, validate_single_int, Maximum,
    MaximumKind, OrderItemSet, Priority, RecordIdSet, ORDER_LIMIT_MAX,
};
use crate::workflow::{Workflow, WorkflowChoice, WorkflowTable};
use std::fmt;
use std::fs;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};

const RADARSAT1: &str = "Radarsat1";

const FILTER_NOTE: &str = "NOTE: Filters must be entered in the format of \
    <field_id>=<value>|<value>|... (field IDs are not case sensitive); separate \
    each filter with a comma. To see a list of field choices, enter '? <field_id>'.";

/// Account details for the session. They are passed to the client but are
/// never part of the parameter set, so they never reach the rebuilt command.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

pub struct InputCollector<'a, R, W> {
    catalog: &'a Catalog,
    workflows: WorkflowTable,
    geometry: &'a dyn GeometryValidator,
    silent: bool,
    prompter: Prompter<R, W>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn strip_quotes(value: &str) -> &str {
    value.trim().trim_matches(|c: char| c == '"' || c == '\'')
}

fn parse_yes_no(answer: &str) -> Result<Option<bool>, SessionError> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" => Ok(Some(true)),
        "n" | "no" | "false" => Ok(Some(false)),
        _ => Err(ValidationError::InvalidAnswer(answer.trim().to_string()).into()),
    }
}

/// Collection ids or 1-based positions in the title-sorted menu.
fn parse_collections(catalog: &Catalog, text: &str) -> Result<Option<Vec<String>>, SessionError> {
    let menu = catalog.sorted_by_title();
    let mut ids: Vec<String> = vec![];
    for entry in text.split(',').map(strip_quotes).filter(|e| !e.is_empty()) {
        let id = if entry.chars().all(|c| c.is_ascii_digit()) {
            let n = validate_single_int(entry, Some(menu.len() as u64))?;
            menu[n as usize - 1].id.clone()
        } else {
            validate_collection(catalog, entry)?
        };
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    if ids.is_empty() {
        return Err(ValidationError::UnknownCollection(text.trim().to_string()).into());
    }
    Ok(Some(ids))
}

fn existing_csv(value: &str) -> Result<Option<PathBuf>, SessionError> {
    let path = PathBuf::from(strip_quotes(value));
    if path.is_file() {
        Ok(Some(path))
    } else {
        Err(SessionError::InputFile(ValidationError::MissingCsv(
            path.display().to_string(),
        )))
    }
}

impl<'a, R: BufRead, W: Write> InputCollector<'a, R, W> {
    pub fn new(
        catalog: &'a Catalog,
        workflows: WorkflowTable,
        geometry: &'a dyn GeometryValidator,
        silent: bool,
        prompter: Prompter<R, W>,
    ) -> Self {
        Self {
            catalog,
            workflows,
            geometry,
            silent,
            prompter,
        }
    }

    pub fn into_prompter(self) -> Prompter<R, W> {
        self.prompter
    }

    pub fn prompter(&mut self) -> &mut Prompter<R, W> {
        &mut self.prompter
    }

    /// Prints a warning for a value that will be asked for again, or hands
    /// the error back if it cannot be retried.
    fn recover(&mut self, err: SessionError) -> Result<(), SessionError> {
        if !err.is_retryable(self.silent) {
            return Err(err);
        }
        warn!("{}", err);
        self.prompter.say(format!("\nWARNING: {}. Please try again.", err))
    }

    fn notice(&mut self, msg: &str) -> Result<(), SessionError> {
        warn!("{}", msg);
        self.prompter.say(format!("\nNOTE: {}", msg))
    }

    /// Notes a command-line value that does not apply to this run.
    fn ignored(&mut self, given: bool, flag: &str, reason: &str) -> Result<(), SessionError> {
        if given {
            self.notice(&format!("The {flag} value will be ignored since {reason}."))?;
        }
        Ok(())
    }

    fn field<T>(
        &mut self,
        given: Option<&str>,
        question: &Question,
        mut parse: impl FnMut(&str) -> Result<Option<T>, SessionError>,
    ) -> Result<Option<T>, SessionError> {
        if let Some(value) = non_empty(given) {
            match parse(value) {
                Ok(v) => return Ok(v),
                Err(e) => self.recover(e)?,
            }
        }
        if self.silent {
            return match &question.default {
                Some(default) => parse(default.as_str()),
                None if question.required => {
                    Err(SessionError::MissingRequiredField(question.field.to_string()))
                }
                None => Ok(None),
            };
        }

        self.prompter.introduce(question)?;
        loop {
            let answer = self.prompter.ask(question)?;
            if answer.is_empty() {
                return Ok(None);
            }
            match parse(answer.as_str()) {
                Ok(v) => return Ok(v),
                Err(e) => self.recover(e)?,
            }
        }
    }

    fn required<T>(
        &mut self,
        given: Option<&str>,
        question: &Question,
        parse: impl FnMut(&str) -> Result<Option<T>, SessionError>,
    ) -> Result<T, SessionError> {
        self.field(given, question, parse)?
            .ok_or_else(|| SessionError::MissingRequiredField(question.field.to_string()))
    }

    fn yes_no(&mut self, given: bool, question: Question) -> Result<bool, SessionError> {
        let question = question.options(["yes", "no"]).default_value("n");
        let given = given.then_some("yes");
        Ok(self.field(given, &question, parse_yes_no)?.unwrap_or(false))
    }

    /// Username from the command line, then the configuration file, then the
    /// operator. Password from the command line, then `env_password`, then the
    /// operator.
    pub fn credentials(
        &mut self,
        cli: &Cli,
        stored_username: Option<&str>,
        env_password: Option<&str>,
    ) -> Result<Credentials, SessionError> {
        let given_user = non_empty(cli.username.as_deref()).map(str::to_string);
        let given_pass = non_empty(cli.password.as_deref()).map(str::to_string);
        if !self.silent && (given_user.is_none() || given_pass.is_none()) {
            self.prompter.section("Enter EODMS Credentials")?;
        }

        let username = match (given_user, non_empty(stored_username)) {
            (Some(u), _) => u,
            (None, Some(u)) => {
                self.prompter
                    .say("\nUsing the username set in the configuration file...")?;
                u.to_string()
            }
            (None, None) => {
                let q = Question::new("username", "Enter the username for authentication").required();
                self.required(None, &q, |v| Ok(Some(v.to_string())))?
            }
        };
        let password = match (given_pass, non_empty(env_password)) {
            (Some(p), _) => p,
            (None, Some(p)) => {
                self.prompter
                    .say("Using the password set in the EODMS_PASSWORD environment variable...")?;
                p.to_string()
            }
            (None, None) => {
                let q = Question::new("password", "Enter the password for authentication").required();
                self.required(None, &q, |v| Ok(Some(v.to_string())))?
            }
        };
        Ok(Credentials { username, password })
    }

    fn workflow_menu(&mut self) -> Result<Workflow, SessionError> {
        self.prompter.section("Choose Process Option")?;
        self.prompter
            .say(format!("\nWhat would you like to do?\n\n{}", self.workflows.menu()))?;
        let question = Question::new("process", "Please choose the type of process").default_value("1");
        let workflows = self.workflows;
        self.required(None, &question, |v| {
            let n = validate_single_int(v, Some(workflows.len() as u64))
                .map_err(|_| ValidationError::InvalidWorkflow(v.to_string()))?;
            Ok(workflows.by_number(n as usize).map(|info| info.workflow))
        })
    }

    /// Returns the workflow to run and whether ordering has to be suppressed.
    fn choose_workflow(&mut self, given: Option<&str>) -> Result<(Workflow, bool), SessionError> {
        let mut choice = None;
        if let Some(name) = non_empty(given) {
            match Workflow::parse(name) {
                Ok(c) => choice = Some(c),
                Err(e) => self.recover(e.into())?,
            }
        }
        let choice = match choice {
            Some(c) => c,
            None if self.silent => WorkflowChoice::Current(Workflow::Full),
            None => WorkflowChoice::Current(self.workflow_menu()?),
        };

        let workflow = choice.workflow();
        if let Some(n) = self.workflows.number_of(workflow) {
            let name = self.workflows.info(workflow).map(|i| i.name).unwrap_or_default();
            let rule = "%".repeat(60);
            self.prompter
                .say(format!("\n{rule}\n Running Process {n}: {name}\n{rule}"))?;
        }

        let suppress_order = match choice {
            WorkflowChoice::SearchOnly => {
                self.notice(
                    "The 'search_only' process is no longer available. Use the \
                     '--no_order' flag to suppress ordering and downloading. A \
                     search will be run without ordering or downloading.",
                )?;
                true
            }
            WorkflowChoice::DownloadOnly => {
                self.notice(
                    "The process 'download_only' is now named 'download_results'. \
                     Please update any command-line syntaxes.",
                )?;
                false
            }
            WorkflowChoice::Current(_) => false,
        };
        Ok((workflow, suppress_order))
    }

    /// Runs the whole session: picks the workflow, then fills in its fields in order.
    pub fn collect(&mut self, cli: &Cli) -> Result<ParameterStore, SessionError> {
        let (workflow, suppress_order) = self.choose_workflow(cli.process.as_deref())?;
        let mut store = ParameterStore::new();
        store.set(ParamValue::Process(workflow));

        match workflow {
            Workflow::Full => {
                info!("Searching, ordering and downloading images using an AOI.");
                self.collect_full(cli, suppress_order, &mut store)?
            }
            Workflow::OrderCsv => {
                info!("Ordering and downloading images using results from a CSV file.");
                self.collect_order_csv(cli, &mut store)?
            }
            Workflow::RecordId => {
                info!("Ordering and downloading images using Record IDs.");
                self.collect_record_id(cli, &mut store)?
            }
            Workflow::DownloadAvailable => {
                info!("Downloading existing order items with status AVAILABLE_FOR_DOWNLOAD.");
                self.collect_download_available(cli, &mut store)?
            }
            Workflow::DownloadResults => {
                info!("Downloading images using results from a CSV file from a previous session.");
                self.collect_download_results(cli, &mut store)?
            }
        }

        if let Some(downloads) = &cli.downloads {
            store.set(ParamValue::Downloads(downloads.clone()));
        }
        Ok(store)
    }

    fn collect_full(
        &mut self,
        cli: &Cli,
        suppress_order: bool,
        store: &mut ParameterStore,
    ) -> Result<(), SessionError> {
        let collections = self.ask_collections(cli.collections.as_deref())?;
        store.set(ParamValue::Collections(collections.clone()));

        let has_radarsat1 = collections.iter().any(|c| c == RADARSAT1);
        self.collect_aws(cli, has_radarsat1, store)?;

        match self.ask_aoi(cli.input_val.as_deref())? {
            Some(aoi) => {
                store.set(ParamValue::InputVal(InputValue::Aoi(aoi)));
                if let Some(overlap) = self.ask_overlap(cli.overlap.as_deref())? {
                    store.set(ParamValue::Overlap(overlap));
                }
            }
            None => self.ignored(
                non_empty(cli.overlap.as_deref()).is_some(),
                "overlap (-ov)",
                "no AOI was given",
            )?,
        }

        if let Some(filters) = self.ask_filters(cli.filters.as_deref(), &collections)? {
            store.set(ParamValue::Filters(filters));
        }

        let question = Question::new(
            "dates",
            "Enter a date range (ex: 20200525-20200630T200950) or a previous \
             time-frame (24 hours) (leave blank to search all years)\n",
        )
        .section("Enter Date Range");
        if let Some(dates) = self.field(cli.dates.as_deref(), &question, |v| Ok(validate_dates(v)?))? {
            store.set(ParamValue::Dates(dates));
        }

        self.collect_output(cli, store)?;

        let no_order = self.ask_no_order(cli.no_order || suppress_order)?;
        store.set(ParamValue::NoOrder(no_order));

        let kind = if no_order {
            MaximumKind::Search
        } else {
            MaximumKind::Order
        };
        if let Some(max) = self.ask_maximum(cli.maximum.as_deref(), kind)? {
            store.set(ParamValue::Maximum(max));
        }

        self.collect_priority(cli, no_order, store)
    }

    fn collect_order_csv(&mut self, cli: &Cli, store: &mut ParameterStore) -> Result<(), SessionError> {
        let csv = self.ask_csv(
            cli.input_val.as_deref(),
            "Enter the full path of the CSV file exported from the EODMS UI website",
        )?;
        let mentions_radarsat1 = String::from_utf8_lossy(&fs::read(&csv)?)
            .to_ascii_lowercase()
            .contains("radarsat-1");
        store.set(ParamValue::InputVal(InputValue::Csv(csv)));
        self.collect_aws(cli, mentions_radarsat1, store)?;

        self.collect_output(cli, store)?;

        let no_order = self.ask_no_order(cli.no_order)?;
        store.set(ParamValue::NoOrder(no_order));

        if let Some(max) = self.ask_maximum(cli.maximum.as_deref(), MaximumKind::OrderCsv)? {
            store.set(ParamValue::Maximum(max));
        }

        self.collect_priority(cli, no_order, store)
    }

    fn collect_record_id(&mut self, cli: &Cli, store: &mut ParameterStore) -> Result<(), SessionError> {
        let question = Question::new(
            "input_val",
            "Enter a single or set of Record IDs. Include the Collection ID next \
             to each ID separated by a colon. Separate each ID with a comma. \
             (Ex: RCMImageProducts:7625368,NAPL:3736869)\n",
        )
        .section("Enter Record ID(s)")
        .required();
        let catalog = self.catalog;
        let ids = self.required(cli.input_val.as_deref(), &question, |v| {
            Ok(Some(RecordIdSet::parse(v, catalog)?))
        })?;
        let has_radarsat1 = ids.contains_collection(RADARSAT1);
        store.set(ParamValue::InputVal(InputValue::RecordIds(ids)));
        self.collect_aws(cli, has_radarsat1, store)?;

        self.collect_output(cli, store)?;

        let no_order = self.ask_no_order(cli.no_order)?;
        store.set(ParamValue::NoOrder(no_order));

        self.collect_priority(cli, no_order, store)
    }

    fn collect_download_available(
        &mut self,
        cli: &Cli,
        store: &mut ParameterStore,
    ) -> Result<(), SessionError> {
        let question = Question::new(
            "orderitems",
            "Enter a list of Order IDs and/or Order Item IDs, separating each ID \
             with a comma and separating Order IDs and Order Items with a vertical \
             line (ex: 'orders:<order_id>,<order_id>|items:<order_item_id>,...') \
             (leave blank to skip)\n",
        )
        .section("Order/Order Item IDs");
        let items = self.field(cli.orderitems.as_deref(), &question, |v| Ok(OrderItemSet::parse(v)?))?;

        match items {
            Some(items) => {
                store.set(ParamValue::Orderitems(items));
                self.ignored(
                    non_empty(cli.maximum.as_deref()).is_some(),
                    "maximum (-m)",
                    "order or item IDs were given",
                )?;
            }
            None => {
                if let Some(max) = self.ask_maximum(cli.maximum.as_deref(), MaximumKind::Download)? {
                    store.set(ParamValue::Maximum(max));
                }
            }
        }

        self.collect_output(cli, store)
    }

    fn collect_download_results(
        &mut self,
        cli: &Cli,
        store: &mut ParameterStore,
    ) -> Result<(), SessionError> {
        let csv = self.ask_csv(
            cli.input_val.as_deref(),
            "Enter the full path of the CSV Results file from a previous session",
        )?;
        store.set(ParamValue::InputVal(InputValue::Csv(csv)));
        self.collect_output(cli, store)
    }

    fn collect_aws(
        &mut self,
        cli: &Cli,
        has_radarsat1: bool,
        store: &mut ParameterStore,
    ) -> Result<(), SessionError> {
        if !has_radarsat1 {
            return self.ignored(cli.aws, "AWS (-a)", "no Radarsat-1 images are involved");
        }
        store.set(ParamValue::Aws(self.ask_aws(cli.aws)?));
        Ok(())
    }

    fn collect_priority(
        &mut self,
        cli: &Cli,
        no_order: bool,
        store: &mut ParameterStore,
    ) -> Result<(), SessionError> {
        if no_order {
            return self.ignored(
                non_empty(cli.priority.as_deref()).is_some(),
                "priority (-l)",
                "no order will be submitted",
            );
        }
        store.set(ParamValue::Priority(self.ask_priority(cli.priority.as_deref())?));
        Ok(())
    }

    fn collect_output(&mut self, cli: &Cli, store: &mut ParameterStore) -> Result<(), SessionError> {
        let question = Question::new(
            "output",
            "Enter the path of the output geospatial file (can also be GeoJSON, \
             KML, GML or Shapefile) (default is no output file)\n",
        )
        .section("Enter Output Geospatial File");
        let output = self.field(cli.output.as_deref(), &question, |v| {
            Ok(Some(strip_quotes(v).to_string()).filter(|o| !o.is_empty()))
        })?;
        if let Some(output) = output {
            store.set(ParamValue::Output(output));
        }
        Ok(())
    }

    fn ask_collections(&mut self, given: Option<&str>) -> Result<Vec<String>, SessionError> {
        let menu = self
            .catalog
            .sorted_by_title()
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}. {} ({})", i + 1, c.title, c.id))
            .collect::<Vec<_>>()
            .join("\n");
        let question = Question::new(
            "collections",
            "Enter the number of a collection from the list above (for multiple \
             collections, enter each number separated with a comma)",
        )
        .section("Enter Collection")
        .intro(format!("\nAvailable Collections:\n\n{}", menu))
        .required();
        let catalog = self.catalog;
        self.required(given, &question, |v| parse_collections(catalog, v))
    }

    fn ask_aws(&mut self, given: bool) -> Result<bool, SessionError> {
        let question = Question::new(
            "aws",
            "For images that have an AWS link, would you like to download the \
             GeoTIFFs from the repository instead of submitting an order to the EODMS?\n",
        )
        .section("Download from AWS?")
        .intro(
            "\nSome Radarsat-1 images contain direct download links to GeoTIFF \
             files in an Open Data AWS Repository.",
        );
        self.yes_no(given, question)
    }

    fn ask_no_order(&mut self, given: bool) -> Result<bool, SessionError> {
        let question = Question::new("no_order", "Would you like to only search and not order?\n")
            .section("Suppress Ordering");
        self.yes_no(given, question)
    }

    fn ask_aoi(&mut self, given: Option<&str>) -> Result<Option<Aoi>, SessionError> {
        let question = Question::new(
            "input_val",
            "Enter the full path name of a GML, KML, Shapefile or GeoJSON \
             containing an AOI or a WKT feature to restrict the search to a \
             specific location\n",
        )
        .section("Enter Input Geospatial File or Feature");
        let geometry = self.geometry;
        self.field(given, &question, |v| Ok(Some(geometry.validate(v)?)))
    }

    fn ask_overlap(&mut self, given: Option<&str>) -> Result<Option<u8>, SessionError> {
        let question = Question::new(
            "overlap",
            "Enter the minimum percentage of overlap between images and the AOI\n",
        )
        .section("Enter Minimum Overlap Percentage");
        self.field(given, &question, |v| Ok(Some(validate_overlap(v)?)))
    }

    fn ask_priority(&mut self, given: Option<&str>) -> Result<Priority, SessionError> {
        let question = Question::new("priority", "Enter the priority level for the order")
            .section("Enter Priority")
            .options(Priority::CHOICES)
            .default_value("medium");
        Ok(self
            .field(given, &question, |v| Ok(Some(v.parse::<Priority>()?)))?
            .unwrap_or_default())
    }

    fn ask_csv(&mut self, given: Option<&str>, text: &str) -> Result<PathBuf, SessionError> {
        let question = Question::new("input_val", text)
            .section("Enter Input CSV File")
            .required();
        self.required(given, &question, existing_csv)
    }

    fn ask_maximum(
        &mut self,
        given: Option<&str>,
        kind: MaximumKind,
    ) -> Result<Option<Maximum>, SessionError> {
        let single = match kind {
            MaximumKind::Search => Some(
                Question::new(
                    "maximum",
                    "Enter the maximum number of images you would like to search \
                     for (leave blank to search for all images)",
                )
                .section("Enter Maximum Search Results"),
            ),
            MaximumKind::Download => Some(
                Question::new(
                    "maximum",
                    "Enter the number of images with status AVAILABLE_FOR_DOWNLOAD \
                     you would like to download (leave blank to download all images \
                     with this status)",
                )
                .section("Enter Maximum for Downloads"),
            ),
            MaximumKind::Order | MaximumKind::OrderCsv => None,
        };
        if let Some(question) = single {
            return self.field(given, &question, |v| Ok(Maximum::parse(v, kind)?));
        }

        if let Some(text) = non_empty(given) {
            match Maximum::parse(text, kind) {
                Ok(max) => return Ok(max),
                Err(e) => self.recover(e.into())?,
            }
        }
        if self.silent {
            return Ok(None);
        }

        self.prompter.section("Enter Maximums for Ordering")?;
        let total = if kind == MaximumKind::Order {
            let question = Question::new(
                "maximum",
                "Enter the total number of images you'd like to order (leave blank for no limit)",
            );
            self.field(None, &question, |v| Ok(Some(validate_single_int(v, None)?)))?
        } else {
            None
        };
        let question = Question::new(
            "maximum",
            "If you'd like a limit of images per order, enter a value (EODMS sets \
             a maximum limit of 100)",
        );
        let per_order = self.field(None, &question, |v| {
            Ok(Some(validate_single_int(v, Some(ORDER_LIMIT_MAX))?))
        })?;
        Ok(Maximum::from_parts(total, per_order))
    }

    fn ask_filters(
        &mut self,
        given: Option<&str>,
        collections: &[String],
    ) -> Result<Option<FilterSpec>, SessionError> {
        let catalog = self.catalog;
        let parser = FilterParser::new(catalog);
        if let Some(text) = non_empty(given) {
            match parser.parse_command_line(text, collections) {
                Ok(spec) => return Ok(Some(spec)),
                Err(e) => self.recover(e.into())?,
            }
        }
        if self.silent {
            return Ok(None);
        }

        self.prompter.section("Enter Filters")?;
        let question = Question::new(
            "filters",
            "Enter the filters you would like to apply to the search\n",
        );
        let mut spec = FilterSpec::new();
        for id in collections {
            let coll = catalog
                .resolve(id)
                .ok_or_else(|| SchemaLookupError::UnknownCollection(id.clone()))?;
            let fields = coll
                .fields
                .iter()
                .map(|f| format!("  {} ({})", f.id, f.title))
                .collect::<Vec<_>>()
                .join("\n");
            self.prompter
                .say(format!("\nAvailable fields for '{}':\n{}", coll.id, fields))?;
            self.prompter.say(FILTER_NOTE)?;

            loop {
                let answer = self.prompter.ask(&question)?;
                if let Some(query) = answer.strip_prefix('?') {
                    let name = query.trim();
                    match coll.field(name) {
                        Some(field) => self.prompter.say(format!(
                            "\nAvailable choices for '{}': {}",
                            name,
                            field.choices_description()
                        ))?,
                        None => self.prompter.say("Not a valid field.")?,
                    }
                    continue;
                }
                match parser.parse_for_collection(&answer, &coll.id) {
                    Ok(clauses) => {
                        spec.extend(&coll.id, clauses);
                        break;
                    }
                    Err(e) => self.recover(e.into())?,
                }
            }
        }
        Ok(Some(spec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;
    use crate::filters::{FilterClause, Operator};
    use crate::geo::AoiValidator;
    use crate::params::Param;
    use std::io::Cursor;

    type TestCollector<'a> = InputCollector<'a, Cursor<Vec<u8>>, Vec<u8>>;

    fn collector<'a>(catalog: &'a Catalog, silent: bool, input: &str) -> TestCollector<'a> {
        InputCollector::new(
            catalog,
            WorkflowTable::standard(),
            &AoiValidator,
            silent,
            Prompter::new(Cursor::new(input.as_bytes().to_vec()), vec![]),
        )
    }

    fn output(c: TestCollector<'_>) -> String {
        String::from_utf8(c.into_prompter().into_inner().1).unwrap()
    }

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["eodms-cli"];
        argv.extend_from_slice(args);
        Cli::try_parse_args(argv).unwrap()
    }

    #[test]
    fn test_interactive_full_session() {
        let catalog = fixtures::catalog();
        // menu: full; collection 2 by title is RCMImageProducts; no AOI;
        // filters; dates; no output; order; total 10; no per-order; priority
        let input = "\n2\n\nbeam_mnemonic=16M11\n24 hours\n\nn\n10\n\nhigh\n";
        let mut c = collector(&catalog, false, input);
        let store = c.collect(&Cli::default()).unwrap();

        assert_eq!(store.workflow(), Some(Workflow::Full));
        assert_eq!(store.collections(), &["RCMImageProducts".to_string()]);
        assert_eq!(store.input(), None);
        assert_eq!(store.get(Param::Overlap), None);
        assert_eq!(
            store.filters().unwrap().get("RCMImageProducts").unwrap(),
            &[FilterClause {
                field: "beam_mnemonic".into(),
                op: Operator::Eq,
                values: vec!["16M11".into()],
            }]
        );
        assert_eq!(
            store.get(Param::Maximum),
            Some(&ParamValue::Maximum(Maximum::Order {
                total: Some(10),
                per_order: None
            }))
        );
        assert_eq!(
            store.get(Param::Priority),
            Some(&ParamValue::Priority(Priority::High))
        );

        let out = output(c);
        assert!(out.contains("Running Process 1: Search, order and/or download"));
        assert!(out.contains("1. National Air Photo Library (NAPL)"));
        assert!(!out.contains("Minimum Overlap"));
    }

    #[test]
    fn test_filter_queries_do_not_advance() {
        let catalog = fixtures::catalog();
        let input = "? colour\n? bogus\n? scale\ncolour=BW|C\n";
        let mut c = collector(&catalog, false, input);
        let spec = c.ask_filters(None, &["NAPL".to_string()]).unwrap().unwrap();
        assert_eq!(spec.get("NAPL").unwrap()[0].values, vec!["BW", "C"]);

        let out = output(c);
        assert!(out.contains("Available choices for 'colour': BW, C, IR"));
        assert!(out.contains("Not a valid field."));
        assert!(out.contains("Available choices for 'scale': any String value"));
    }

    #[test]
    fn test_empty_filter_answer_keeps_collection() {
        let catalog = fixtures::catalog();
        let mut c = collector(&catalog, false, "\n");
        let spec = c.ask_filters(None, &["NAPL".to_string()]).unwrap().unwrap();
        assert_eq!(spec.get("NAPL"), Some(&[][..]));
    }

    #[test]
    fn test_unknown_filter_field_is_fatal() {
        let catalog = fixtures::catalog();
        let mut c = collector(&catalog, false, "bogus=1\ncolour=C\n");
        let err = c.ask_filters(None, &["NAPL".to_string()]).unwrap_err();
        assert!(matches!(err, SessionError::SchemaLookup(_)));
    }

    #[test]
    fn test_invalid_answer_reprompts() {
        let catalog = fixtures::catalog();
        let mut c = collector(&catalog, false, "yesterday\n20200525-20200630\n");
        let question = Question::new("dates", "Dates");
        let dates = c.field(None, &question, |v| Ok(validate_dates(v)?)).unwrap();
        assert_eq!(dates.unwrap().to_string(), "20200525-20200630");
        assert!(output(c).contains("WARNING: the dates entered are invalid"));
    }

    #[test]
    fn test_invalid_flag_value_falls_back_to_prompt() {
        let catalog = fixtures::catalog();
        let mut c = collector(&catalog, false, "NAPL\n");
        let collections = c.ask_collections(Some("Landsat")).unwrap();
        assert_eq!(collections, vec!["NAPL".to_string()]);
    }

    #[test]
    fn test_silent_defaults() {
        let catalog = fixtures::catalog();
        let mut c = collector(&catalog, true, "");
        let store = c.collect(&cli(&["-c", "NAPL", "-s"])).unwrap();
        assert_eq!(store.workflow(), Some(Workflow::Full));
        assert_eq!(store.get(Param::NoOrder), Some(&ParamValue::NoOrder(false)));
        assert_eq!(
            store.get(Param::Priority),
            Some(&ParamValue::Priority(Priority::Medium))
        );
        assert_eq!(store.get(Param::Filters), None);
        assert_eq!(store.get(Param::Dates), None);
        assert_eq!(store.get(Param::Aws), None);
    }

    #[test]
    fn test_silent_missing_collections_is_fatal() {
        let catalog = fixtures::catalog();
        let mut c = collector(&catalog, true, "");
        let err = c.collect(&cli(&["-s"])).unwrap_err();
        assert!(matches!(err, SessionError::MissingRequiredField(f) if f == "collections"));
    }

    #[test]
    fn test_silent_invalid_value_is_fatal() {
        let catalog = fixtures::catalog();
        let mut c = collector(&catalog, true, "");
        let err = c
            .collect(&cli(&["-c", "NAPL", "-d", "2020-05-25", "-s"]))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::InvalidDates(_))
        ));
    }

    #[test]
    fn test_end_of_input_terminates() {
        let catalog = fixtures::catalog();
        let mut c = collector(&catalog, false, "1\n");
        let err = c.collect(&Cli::default()).unwrap_err();
        assert!(matches!(err, SessionError::InputTerminated(f) if f == "collections"));
    }

    #[test]
    fn test_search_only_alias_suppresses_ordering() {
        let catalog = fixtures::catalog();
        let mut c = collector(&catalog, true, "");
        let store = c
            .collect(&cli(&["-r", "search_only", "-c", "R1", "-m", "30", "-s"]))
            .unwrap();
        assert_eq!(store.workflow(), Some(Workflow::Full));
        assert!(store.no_order());
        assert_eq!(store.get(Param::Priority), None);
        assert_eq!(store.get(Param::Aws), Some(&ParamValue::Aws(false)));
        assert_eq!(
            store.get(Param::Maximum),
            Some(&ParamValue::Maximum(Maximum::Count(30)))
        );
        assert!(output(c).contains("'search_only' process is no longer available"));
    }

    #[test]
    fn test_record_id_with_radarsat1_asks_aws() {
        let catalog = fixtures::catalog();
        let mut c = collector(&catalog, false, "y\n\nn\nurgent\n");
        let store = c
            .collect(&cli(&["-r", "record_id", "-i", "r1:12345,NAPL:678"]))
            .unwrap();
        assert_eq!(store.input().unwrap().to_string(), "Radarsat1:12345,NAPL:678");
        assert_eq!(store.get(Param::Aws), Some(&ParamValue::Aws(true)));
        assert_eq!(
            store.get(Param::Priority),
            Some(&ParamValue::Priority(Priority::Urgent))
        );
    }

    #[test]
    fn test_missing_csv_is_fatal_even_interactively() {
        let catalog = fixtures::catalog();
        let mut c = collector(&catalog, false, "still_missing.csv\n");
        let err = c
            .collect(&cli(&["-r", "order_csv", "-i", "/nowhere/results.csv"]))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::InputFile(ValidationError::MissingCsv(_))
        ));
    }

    #[test]
    fn test_order_csv_bare_maximum_is_per_order() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("results.csv");
        fs::write(&csv, "Record ID,Collection\n123,RADARSAT-1\n").unwrap();
        let catalog = fixtures::catalog();
        let mut c = collector(&catalog, true, "");
        let store = c
            .collect(&cli(&[
                "-r",
                "order_csv",
                "-i",
                csv.to_str().unwrap(),
                "-m",
                "25",
                "-s",
            ]))
            .unwrap();
        assert_eq!(store.get(Param::Aws), Some(&ParamValue::Aws(false)));
        assert_eq!(
            store.get(Param::Maximum),
            Some(&ParamValue::Maximum(Maximum::Order {
                total: None,
                per_order: Some(25)
            }))
        );
    }

    #[test]
    fn test_download_available_skips_maximum_with_ids() {
        let catalog = fixtures::catalog();
        let mut c = collector(&catalog, true, "");
        let store = c
            .collect(&cli(&[
                "-r",
                "download_available",
                "--orderitems",
                "orders:1,2",
                "-m",
                "5",
                "-s",
            ]))
            .unwrap();
        assert!(store.get(Param::Orderitems).is_some());
        assert_eq!(store.get(Param::Maximum), None);
        assert!(output(c).contains(
            "NOTE: The maximum (-m) value will be ignored since order or item IDs were given."
        ));
    }

    #[test]
    fn test_inapplicable_flags_are_noted() {
        let catalog = fixtures::catalog();
        let mut c = collector(&catalog, true, "");
        let store = c
            .collect(&cli(&["-c", "NAPL", "-a", "-ov", "40", "-l", "high", "-nord", "-s"]))
            .unwrap();
        assert_eq!(store.get(Param::Aws), None);
        assert_eq!(store.get(Param::Overlap), None);
        assert_eq!(store.get(Param::Priority), None);

        let out = output(c);
        assert!(out.contains("The AWS (-a) value will be ignored since no Radarsat-1 images are involved."));
        assert!(out.contains("The overlap (-ov) value will be ignored since no AOI was given."));
        assert!(out.contains("The priority (-l) value will be ignored since no order will be submitted."));
    }

    #[test]
    fn test_applicable_flags_are_not_noted() {
        let catalog = fixtures::catalog();
        let mut c = collector(&catalog, true, "");
        c.collect(&cli(&["-c", "R1", "-a", "-l", "high", "-s"])).unwrap();
        assert!(!output(c).contains("will be ignored"));
    }

    #[test]
    fn test_workflow_menu_rejects_out_of_range_answers() {
        let catalog = fixtures::catalog();
        let mut c = collector(&catalog, false, "6\n0\nx\n2\n");
        assert_eq!(c.workflow_menu().unwrap(), Workflow::OrderCsv);

        let out = output(c);
        assert!(out.contains("WARNING: '6' is not a valid process. Please try again."));
        assert!(out.contains("WARNING: '0' is not a valid process. Please try again."));
        assert!(out.contains("WARNING: 'x' is not a valid process. Please try again."));
    }

    #[test]
    fn test_order_csv_reads_non_utf8_file() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("latin1.csv");
        fs::write(&csv, b"Record ID,Collection,Site\n123,RADARSAT-1,Montr\xe9al\n").unwrap();
        let catalog = fixtures::catalog();
        let mut c = collector(&catalog, true, "");
        let store = c
            .collect(&cli(&["-r", "order_csv", "-i", csv.to_str().unwrap(), "-a", "-s"]))
            .unwrap();
        assert_eq!(store.get(Param::Aws), Some(&ParamValue::Aws(true)));
        assert_eq!(store.input().unwrap().to_string(), csv.display().to_string());
    }

    #[test]
    fn test_credentials_sources() {
        let catalog = fixtures::catalog();
        let mut c = collector(&catalog, false, "secret\n");
        let creds = c.credentials(&Cli::default(), Some("stored"), None).unwrap();
        assert_eq!(creds.username, "stored");
        assert_eq!(creds.password, "secret");
        assert!(!format!("{:?}", creds).contains("secret"));

        let mut c = collector(&catalog, true, "");
        let err = c.credentials(&cli(&["-u", "me"]), None, None).unwrap_err();
        assert!(matches!(err, SessionError::MissingRequiredField(f) if f == "password"));

        let mut c = collector(&catalog, true, "");
        let creds = c
            .credentials(&cli(&["-u", "me"]), None, Some("from-env"))
            .unwrap();
        assert_eq!(creds.password, "from-env");
    }
}
