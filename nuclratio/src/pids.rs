//! Labels for PDG Monte Carlo particle IDs.

const QUARKS: [&str; 6] = ["d", "u", "s", "c", "b", "t"];

/// Return the charge-conjugated PDG ID of `pid`.
#[must_use]
pub const fn charge_conjugate_pdg_pid(pid: i32) -> i32 {
    match pid {
        21 | 22 => pid,
        _ => -pid,
    }
}

/// Returns a short label for the parton with PDG ID `pid`, for example `g` for the gluon or
/// `ubar` for the anti-up quark. Returns `None` for IDs that are not partons.
#[must_use]
pub fn pid_label(pid: i32) -> Option<String> {
    match pid {
        21 | 0 => Some("g".to_owned()),
        22 => Some("photon".to_owned()),
        1..=6 => usize::try_from(pid - 1).ok().map(|i| QUARKS[i].to_owned()),
        -6..=-1 => pid_label(charge_conjugate_pdg_pid(pid)).map(|quark| quark + "bar"),
        _ => None,
    }
}

/// Returns the PDG ID for `flavor`, which is either a number or a label as returned by
/// [`pid_label`].
#[must_use]
pub fn parse_pid(flavor: &str) -> Option<i32> {
    if let Ok(pid) = flavor.parse() {
        return Some(pid);
    }

    match flavor {
        "g" => Some(21),
        "photon" => Some(22),
        _ => {
            let (quark, sign) = flavor
                .strip_suffix("bar")
                .map_or((flavor, 1), |quark| (quark, -1));

            QUARKS
                .iter()
                .position(|&label| label == quark)
                .and_then(|index| i32::try_from(index + 1).ok())
                .map(|pid| sign * pid)
        }
    }
}

/// Label for `pid` used in titles and table headers: the short label if there is one, otherwise
/// the number itself.
#[must_use]
pub fn flavor_label(pid: i32) -> String {
    pid_label(pid).unwrap_or_else(|| pid.to_string())
}
