//! # Shell Completion Module
//!
//! - Static completion scripts generated by `clap_complete`
//! - Enhanced bash and fish scripts that complete mood, goal, context and
//!   activity labels by asking the binary itself (`moodmix complete-labels`)
//!
//! ## Usage
//!
//! ```bash
//! moodmix completion bash > ~/.local/share/bash-completion/completions/moodmix
//! moodmix completion-enhanced fish > ~/.config/fish/completions/moodmix.fish
//! ```

use crate::cli::{LabelKind, Shell};
use crate::mood::{self, Emotion};
use crate::sequencer::Activity;
use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use std::io;

/// Generate shell completions for the given shell
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

/// Convert our Shell enum to clap_complete's Shell enum
#[must_use]
pub fn shell_to_completion_shell(shell: &Shell) -> CompletionShell {
    match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    }
}

/// Every label of one family, sorted.
#[must_use]
pub fn label_completions(kind: LabelKind) -> Vec<String> {
    let mut labels: Vec<String> = match kind {
        LabelKind::Mood => Emotion::ALL.iter().map(|e| e.name().to_string()).collect(),
        LabelKind::Goal => mood::known_goals().into_iter().map(str::to_string).collect(),
        LabelKind::Context => mood::known_contexts().into_iter().map(str::to_string).collect(),
        LabelKind::Activity => Activity::ALL.iter().map(|a| a.name().to_string()).collect(),
    };
    labels.sort();
    labels
}

pub fn print_label_completions(kind: LabelKind) {
    for label in label_completions(kind) {
        println!("{label}");
    }
}

/// Enhanced fish completion script with label completion.
#[must_use]
pub fn enhanced_fish_completion() -> String {
    r#"# Enhanced moodmix completion script for Fish shell
# Install with: moodmix completion-enhanced fish > ~/.config/fish/completions/moodmix.fish

function __moodmix_labels
    if command -sq moodmix
        moodmix complete-labels $argv[1] 2>/dev/null
    end
end

complete -c moodmix -e

complete -c moodmix -s h -l help -d 'Print help information'
complete -c moodmix -s V -l version -d 'Print version information'
complete -c moodmix -l config -r -d 'Config file'
complete -c moodmix -l baselines -r -d 'Heart-rate baseline file'
complete -c moodmix -l feedback-db -r -d 'Feedback database'

complete -c moodmix -f -n '__fish_use_subcommand' -a 'detect' -d 'Fuse a face-classifier reading with heart rate'
complete -c moodmix -f -n '__fish_use_subcommand' -a 'target' -d 'Print the target feature vector as JSON'
complete -c moodmix -f -n '__fish_use_subcommand' -a 'recommend' -d 'Generate a playlist from a local catalog file'
complete -c moodmix -f -n '__fish_use_subcommand' -a 'calibrate' -d 'Measure a resting heart rate'
complete -c moodmix -f -n '__fish_use_subcommand' -a 'zone' -d 'Classify a heart rate into a training zone'
complete -c moodmix -f -n '__fish_use_subcommand' -a 'feedback' -d 'Record feedback for a playlist'
complete -c moodmix -f -n '__fish_use_subcommand' -a 'completion' -d 'Generate shell completions'
complete -c moodmix -f -n '__fish_use_subcommand' -a 'completion-enhanced' -d 'Generate enhanced shell completions'

complete -c moodmix -f -n '__fish_seen_subcommand_from target recommend' -l mood -a '(__moodmix_labels mood)' -d 'Mood'
complete -c moodmix -f -n '__fish_seen_subcommand_from recommend' -l custom-mood -a '(__moodmix_labels mood)' -d 'Mood override'
complete -c moodmix -f -n '__fish_seen_subcommand_from recommend' -l transition-to -a '(__moodmix_labels mood)' -d 'Transition target mood'
complete -c moodmix -f -n '__fish_seen_subcommand_from target recommend' -l goal -a '(__moodmix_labels goal)' -d 'Listener goal'
complete -c moodmix -f -n '__fish_seen_subcommand_from target recommend' -l context -a '(__moodmix_labels context)' -d 'Listening context'
complete -c moodmix -f -n '__fish_seen_subcommand_from recommend' -l activity -a '(__moodmix_labels activity)' -d 'Activity filter'
complete -c moodmix -n '__fish_seen_subcommand_from recommend' -l catalog -r -d 'Catalog JSON file'

complete -c moodmix -f -n '__fish_seen_subcommand_from completion completion-enhanced' -a 'bash zsh fish power-shell elvish'
"#
    .to_string()
}

/// Enhanced bash completion script with label completion.
#[must_use]
pub fn enhanced_bash_completion() -> String {
    r#"#!/bin/bash
# Enhanced moodmix completion script
# Install with: moodmix completion-enhanced bash > ~/.local/share/bash-completion/completions/moodmix

_moodmix_labels() {
    if command -v moodmix >/dev/null 2>&1; then
        moodmix complete-labels "$1" 2>/dev/null
    fi
}

_moodmix() {
    local cur prev words cword
    _init_completion || return

    case "${prev}" in
        --mood|--custom-mood|--transition-to)
            COMPREPLY=($(compgen -W "$(_moodmix_labels mood)" -- "${cur}"))
            return 0
            ;;
        --goal)
            COMPREPLY=($(compgen -W "$(_moodmix_labels goal)" -- "${cur}"))
            return 0
            ;;
        --context)
            COMPREPLY=($(compgen -W "$(_moodmix_labels context)" -- "${cur}"))
            return 0
            ;;
        --activity)
            COMPREPLY=($(compgen -W "$(_moodmix_labels activity)" -- "${cur}"))
            return 0
            ;;
        --catalog|--config|--baselines|--feedback-db)
            _filedir
            return 0
            ;;
        completion|completion-enhanced)
            COMPREPLY=($(compgen -W "bash zsh fish power-shell elvish" -- "${cur}"))
            return 0
            ;;
    esac

    local subcommands="detect target recommend calibrate zone feedback completion completion-enhanced help"

    if [[ $cword -eq 1 ]]; then
        COMPREPLY=($(compgen -W "$subcommands --help --version" -- "${cur}"))
    else
        case "${words[1]}" in
            detect)
                COMPREPLY=($(compgen -W "--label --confidence --bpm --mock-sensor --help" -- "${cur}"))
                ;;
            target)
                COMPREPLY=($(compgen -W "--mood --goal --context --bpm --help" -- "${cur}"))
                ;;
            recommend)
                COMPREPLY=($(compgen -W "--catalog --mood --goal --context --bpm --custom-mood --activity --transition-to --length --max-per-artist --user --help" -- "${cur}"))
                ;;
            calibrate)
                COMPREPLY=($(compgen -W "--user --seconds --interval-ms --seed --help" -- "${cur}"))
                ;;
            zone)
                COMPREPLY=($(compgen -W "--bpm --user --help" -- "${cur}"))
                ;;
            feedback)
                COMPREPLY=($(compgen -W "--playlist --rating --text --song --help" -- "${cur}"))
                ;;
            *)
                COMPREPLY=($(compgen -W "$subcommands" -- "${cur}"))
                ;;
        esac
    fi
} &&
complete -F _moodmix moodmix

# ex: filetype=sh
"#
    .to_string()
}
