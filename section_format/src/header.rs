/// Header every section file starts with. Its values are a constant template
/// expected by the downstream tools and don't depend on the sliced mesh, not
/// even the section or point counts. Trailing whitespace is significant.
pub const HEADER: &str = concat!(
    "<  XLEF  ><  YLEF  ><  XTEF  ><  YTEF  >< XTEF0  ><  NSF   >                     \n",
    "  0.00000   0.00000  29.82000   1.69800  29.4000  33.00000                    \n",
    "<   XF   ><   YF   ><   RF   ><  FCONT  > - SECTION -  2                        \n",
    "  0.23146   0.05404   0.36250   1.00000                                        \n",
    "<   NT   >                                                                      \n",
    "  30.\n",
);

/// Column labels written before the points of every section.
pub const SECTION_COLUMNS: &str = "<    Y   ><    Z   >";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout() {
        let lines = HEADER.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 6);
        assert_eq!(
            lines.iter().map(|x| x.len()).collect::<Vec<_>>(),
            [81, 78, 80, 79, 80, 5]
        );
        assert!(lines[2].contains(" - SECTION -  2"));
        assert_eq!(lines[5], "  30.");
        assert!(HEADER.ends_with("  30.\n"));
    }
}
