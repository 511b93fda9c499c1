use std::{env, process};

use chrono::{Local, NaiveDate};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use uuid::Uuid;

use finance_core::{
    config::ConfigManager,
    engine::{
        EntryService, InvoiceService, MutationScope, RecurrenceService, SeriesService,
        SummaryService,
    },
    init,
    ledger::{
        AutomationRule, CardTerms, CycleKey, Direction, EntryStatus, EntryTemplate, Instrument,
        LedgerEntry, RepeatRule, RuleFormula,
    },
    storage::{EntryFilter, EntryPatch, EntryStore, InstrumentStore, JsonStore, RuleStore},
    utils::book_file,
};

static THEME: Lazy<ColorfulTheme> = Lazy::new(ColorfulTheme::default);

fn main() {
    init();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let command = require(&mut args);
    let today = Local::now().date_naive();

    match command.as_str() {
        "new" => {
            let name = require(&mut args);
            let path = book_file(&name);
            JsonStore::create(&path, &name)?;

            let manager = ConfigManager::new()?;
            let mut config = manager.load()?;
            config.default_book = Some(path.clone());
            manager.save(&config)?;
            println!("Created book `{}` at {}", name, path.display());
        }
        "wallet" => {
            let mut store = open_book(&require(&mut args))?;
            let name = require(&mut args);
            let id = store.add_instrument(Instrument::wallet(&name))?;
            println!("Added wallet `{}` ({})", name, id);
        }
        "card" => {
            let mut store = open_book(&require(&mut args))?;
            let name = require(&mut args);
            let closing_day: u32 = require(&mut args).parse()?;
            let due_day: u32 = require(&mut args).parse()?;
            let terms = CardTerms::new(closing_day, due_day);
            if !terms.day_fields_in_range() {
                return Err("closing and due days must be between 1 and 31".into());
            }
            let id = store.add_instrument(Instrument::revolving_credit(&name, terms))?;
            println!(
                "Added card `{}` ({}), closes day {}, due day {}",
                name, id, closing_day, due_day
            );
        }
        "rule" => {
            let mut store = open_book(&require(&mut args))?;
            let name = require(&mut args);
            let kind = require(&mut args);
            let value: Decimal = require(&mut args).parse()?;
            let category = require(&mut args);
            let formula = match kind.as_str() {
                "percentage" => RuleFormula::Percentage(value),
                "fixed" => RuleFormula::FixedAmount(value),
                other => return Err(format!("unknown rule kind `{other}`").into()),
            };
            let id = store.add_rule(AutomationRule::new(&name, formula, &category))?;
            println!("Added rule `{}` ({})", name, id);
        }
        "add" => {
            let book = require(&mut args);
            let direction = parse_direction(&require(&mut args))?;
            let description = require(&mut args);
            let category = require(&mut args);
            let amount: Decimal = require(&mut args).parse()?;
            let base_date = parse_date(&require(&mut args))?;
            let repeat = match args.next() {
                Some(raw) => parse_repeat(&raw)?,
                None => RepeatRule::Single,
            };
            let instrument_id = match args.next() {
                Some(raw) => Some(Uuid::parse_str(&raw)?),
                None => None,
            };

            let mut template =
                EntryTemplate::new(direction, description, category, amount, base_date);
            if let Some(id) = instrument_id {
                template = template.with_instrument(id);
            }

            let policy = ConfigManager::new()?.load()?.expansion_policy();
            let mut store = open_book(&book)?;
            let created = RecurrenceService::record(&mut store, &template, repeat, &policy)?;
            println!("Recorded {} entr{}:", created.len(), plural_y(created.len()));
            for entry in &created {
                print_entry(entry, today);
            }
        }
        "list" => {
            let store = open_book(&require(&mut args))?;
            let entries = match args.next().as_deref() {
                None => store.list_entries(&EntryFilter::default())?,
                Some("pending") => store.list_entries(&EntryFilter {
                    status: Some(EntryStatus::Pending),
                    ..EntryFilter::default()
                })?,
                Some("settled") => store.list_entries(&EntryFilter {
                    status: Some(EntryStatus::Settled),
                    ..EntryFilter::default()
                })?,
                Some("overdue") => SummaryService::overdue(&store, today)?,
                Some(other) => return Err(format!("unknown list filter `{other}`").into()),
            };
            for entry in &entries {
                print_entry(entry, today);
            }
            println!("{} entr{}", entries.len(), plural_y(entries.len()));
        }
        "instruments" => {
            let store = open_book(&require(&mut args))?;
            for instrument in store.list_instruments()? {
                let kind = match instrument.card_terms() {
                    Some(terms) => format!(
                        "card, closes day {}, due day {}",
                        terms.closing_day, terms.due_day
                    ),
                    None => "wallet".to_string(),
                };
                println!("{}  {}  ({})", instrument.id, instrument.name, kind);
            }
        }
        "settle" => {
            let mut store = open_book(&require(&mut args))?;
            let id = Uuid::parse_str(&require(&mut args))?;
            let on = match args.next() {
                Some(raw) => parse_date(&raw)?,
                None => today,
            };
            let settled = EntryService::settle(&mut store, id, on)?;
            println!("Settled `{}` on {}", settled.description, on);
        }
        "reopen" => {
            let mut store = open_book(&require(&mut args))?;
            let id = Uuid::parse_str(&require(&mut args))?;
            let reopened = EntryService::reopen(&mut store, id)?;
            println!("Reopened `{}`", reopened.description);
        }
        "edit" => {
            let mut store = open_book(&require(&mut args))?;
            let id = Uuid::parse_str(&require(&mut args))?;
            let rest: Vec<String> = args.collect();
            let (flags, pairs): (Vec<&String>, Vec<&String>) =
                rest.iter().partition(|arg| arg.starts_with("--"));
            let patch = parse_patch(&pairs)?;
            let scope = resolve_scope(&store, id, &flags)?;
            let changed = SeriesService::apply_edit(&mut store, id, &patch, scope)?;
            println!("Updated {} entr{}", changed, plural_y(changed));
        }
        "delete" => {
            let mut store = open_book(&require(&mut args))?;
            let id = Uuid::parse_str(&require(&mut args))?;
            let flags: Vec<String> = args.collect();
            let flags: Vec<&String> = flags.iter().collect();
            let scope = resolve_scope(&store, id, &flags)?;
            let removed = SeriesService::apply_delete(&mut store, id, scope)?;
            println!("Deleted {} entr{}", removed, plural_y(removed));
        }
        "close" => {
            let mut store = open_book(&require(&mut args))?;
            let card_id = Uuid::parse_str(&require(&mut args))?;
            let cycle: CycleKey = require(&mut args).parse()?;
            let invoice = InvoiceService::close(&mut store, card_id, cycle, today)?;
            println!(
                "Closed cycle {}: `{}` for {} due {}",
                cycle, invoice.description, invoice.amount, invoice.due_date
            );
        }
        "summary" => {
            let store = open_book(&require(&mut args))?;
            let currency = ConfigManager::new()?.load()?.currency;
            let totals = SummaryService::totals(&store)?;
            println!(
                "Settled:   {} in, {} out, balance {} {}",
                totals.settled_income, totals.settled_expense, totals.balance, currency
            );
            println!(
                "Projected: {} in, {} out, balance {} {}",
                totals.projected_income,
                totals.projected_expense,
                totals.projected_balance,
                currency
            );

            let overdue = SummaryService::overdue(&store, today)?;
            if !overdue.is_empty() {
                println!(
                    "{}",
                    format!("{} overdue entr{}", overdue.len(), plural_y(overdue.len()))
                        .bright_red()
                );
            }

            let breakdown = SummaryService::expense_breakdown(&store)?;
            if !breakdown.is_empty() {
                println!("Spending by category:");
                for (category, amount) in breakdown {
                    println!("  {:<20} {}", category, amount);
                }
            }
        }
        _ => {
            print_usage();
            process::exit(1);
        }
    }

    Ok(())
}

fn require(args: &mut impl Iterator<Item = String>) -> String {
    args.next().unwrap_or_else(|| {
        print_usage();
        process::exit(1);
    })
}

fn open_book(name: &str) -> Result<JsonStore, Box<dyn std::error::Error>> {
    Ok(JsonStore::open(book_file(name))?)
}

fn parse_direction(value: &str) -> Result<Direction, Box<dyn std::error::Error>> {
    match value {
        "payable" => Ok(Direction::Payable),
        "receivable" => Ok(Direction::Receivable),
        other => Err(format!("unknown direction `{other}`").into()),
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    Ok(NaiveDate::parse_from_str(value, "%Y-%m-%d")?)
}

fn parse_repeat(value: &str) -> Result<RepeatRule, Box<dyn std::error::Error>> {
    if value == "single" {
        return Ok(RepeatRule::Single);
    }
    if value == "auto-renew" {
        return Ok(RepeatRule::AutoRenew);
    }
    if let Some(count) = value.strip_prefix("installments:") {
        return Ok(RepeatRule::Installments(count.parse()?));
    }
    if let Some(count) = value.strip_prefix("recurring:") {
        return Ok(RepeatRule::Recurring(count.parse()?));
    }
    Err(format!("unknown repeat mode `{value}`").into())
}

fn parse_patch(pairs: &[&String]) -> Result<EntryPatch, Box<dyn std::error::Error>> {
    if pairs.is_empty() {
        return Err("nothing to edit, pass at least one field=value".into());
    }
    let mut patch = EntryPatch::default();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected field=value, got `{pair}`"))?;
        match key {
            "description" => patch.description = Some(value.to_string()),
            "category" => patch.category = Some(value.to_string()),
            "amount" => patch.amount = Some(value.parse()?),
            "due" => patch.due_date = Some(parse_date(value)?),
            "instrument" => patch.instrument = Some(Uuid::parse_str(value)?),
            other => return Err(format!("unknown field `{other}`").into()),
        }
    }
    Ok(patch)
}

/// Explicit flags win; otherwise series members get an interactive prompt and
/// loose entries default to the narrow scope.
fn resolve_scope(
    store: &JsonStore,
    id: Uuid,
    flags: &[&String],
) -> Result<MutationScope, Box<dyn std::error::Error>> {
    let mut only = false;
    let mut future = false;
    for flag in flags {
        match flag.as_str() {
            "--only-this" => only = true,
            "--this-and-future" => future = true,
            other => return Err(format!("unknown flag `{other}`").into()),
        }
    }
    if only && future {
        return Err("pass at most one of --only-this / --this-and-future".into());
    }
    if only {
        return Ok(MutationScope::OnlyThis);
    }
    if future {
        return Ok(MutationScope::ThisAndFuture);
    }

    if store.get_entry(id)?.series_id().is_none() {
        return Ok(MutationScope::OnlyThis);
    }
    let wide = Confirm::with_theme(&*THEME)
        .with_prompt("Apply to this and all future occurrences?")
        .default(false)
        .interact()?;
    Ok(if wide {
        MutationScope::ThisAndFuture
    } else {
        MutationScope::OnlyThis
    })
}

fn print_entry(entry: &LedgerEntry, today: NaiveDate) {
    let status = if entry.is_overdue(today) {
        "overdue".bright_red()
    } else {
        match entry.status {
            EntryStatus::Pending => "pending".bright_yellow(),
            EntryStatus::Settled => "settled".bright_green(),
        }
    };
    let direction = match entry.direction {
        Direction::Payable => "payable   ",
        Direction::Receivable => "receivable",
    };
    println!(
        "{}  {}  {}  {:>12}  {}  {} [{}]",
        entry.id, entry.due_date, direction, entry.amount, status, entry.description,
        entry.category
    );
}

fn plural_y(count: usize) -> &'static str {
    if count == 1 {
        "y"
    } else {
        "ies"
    }
}

fn print_usage() {
    eprintln!(
        "Usage: finance_core_cli <command>\n\
         Commands:\n  \
         new <book>\n  \
         wallet <book> <name>\n  \
         card <book> <name> <closing-day> <due-day>\n  \
         rule <book> <name> percentage|fixed <value> <category>\n  \
         add <book> payable|receivable <description> <category> <amount> <yyyy-mm-dd>\n      \
         [single|installments:<n>|recurring:<n>|auto-renew] [instrument-id]\n  \
         list <book> [pending|settled|overdue]\n  \
         instruments <book>\n  \
         settle <book> <entry-id> [yyyy-mm-dd]\n  \
         reopen <book> <entry-id>\n  \
         edit <book> <entry-id> <field>=<value>... [--only-this|--this-and-future]\n  \
         delete <book> <entry-id> [--only-this|--this-and-future]\n  \
         close <book> <card-id> <yyyy-mm>\n  \
         summary <book>"
    );
}
