/*!

# Manual

This crate tabulates ranked elections under the Single Transferable Vote
elimination rule and searches for the smallest group of voters able to steer
the outcome to an alternative they all prefer.

## Election definition format

The file format consumed by the `stvmanip` binary is line oriented:

```text
# ALTERNATIVE NAME 1: Memphis
# ALTERNATIVE NAME 2: Nashville
# ALTERNATIVE NAME 3: Knoxville

# 42 voters submitted the ballot "Memphis, then Nashville and Knoxville tied"
42: 1,{2,3}
7: 3,2,1
```

- `# ALTERNATIVE NAME <id>: <name>` declares one alternative. Any other line
  starting with `#`, and any blank line, is ignored.
- `<count>: <preference-list>` declares that `count` voters submitted the
  same ballot. The preference list is comma separated, front = most
  preferred; a brace group such as `{2,3}` ranks several alternatives
  equally at one position.
- Lines matching neither pattern, and ballot lines whose preference list is
  malformed (unbalanced braces, an empty group, a repeated alternative), are
  skipped.

## Tabulation

[`tabulate`](crate::tabulate) eliminates one alternative per round:

1. Every non-exhausted ballot gives one vote to its front preference. A tie
   group at the front splits the vote equally among its members that are
   still active.
2. If all remaining alternatives hold the same tally, the count stops and
   they are all declared winners.
3. Otherwise the alternative with the lowest tally is eliminated, the
   smallest id winning the tie-break, and every ballot advances past its
   eliminated front preferences.

The run is fully deterministic and returns per-round statistics along with
the winner set.

## Manipulation search

[`find_minimum_coalition`](crate::find_minimum_coalition) asks: given the
sincere winner, what is the smallest coalition of voters that can force a
different alternative to win by all submitting the same insincere ballot,
where each member actually prefers the new winner?

For each prospective winner `w` (ascending id), the voters who sincerely
prefer `w` to the true winner form the motivated set; candidates with an
empty motivated set are skipped. Coalitions are tried by growing size, and
within one size in lexicographic order of voter indices, each trial
replacing the coalition's ballots with `w` first, the sincere winner last,
and everything else in between. The first trial whose tabulation elects `w`
uniquely is returned.

The search is exhaustive and exponential in the size bound. For large
elections, [`find_minimum_coalition_with_cancel`](crate::find_minimum_coalition_with_cancel)
accepts a hook polled between coalition sizes to abandon the search.

*/
