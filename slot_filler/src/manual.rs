/*!

This is the long-form manual for `slot_filler` and `testsheets`.

## Documents and slots

A fillable test sheet holds a fixed number of candidates. Each candidate box is a
*slot*, and each slot is made of nine fields: name, street, city, postal code, email,
phone, and the day, month and year of birth.

The names of these fields are different for every document, and rarely regular. A
layout describes them with:
* one label per attribute (`Name`, `Address`, `DOBD`, ...)
* for each slot, a prefix and a suffix: the field name is `prefix + label + suffix`
* for each slot, optional overrides when a field does not follow the pattern. An override
  is either a single field name, or a list of field names that all receive the value.

The built-in layouts are listed in [`crate::templates`]. Before using a new layout, run
[`crate::validate_layout`] on it: two slots sharing a field name means that one candidate
silently overwrites the other one.

## Roster

The roster is a CSV or Excel file with one candidate per row. The default columns are
the ones of the registration exports:

| attribute | column |
|---|---|
| name | `AttendeeName` (written "Last, First") |
| street | `Street` |
| city | `City` |
| postal | `PostalCode` |
| email | `E-mail` |
| phone | `AttendeePhone` |
| date of birth | `DateOfBirth` |

Missing cells are left empty. Dates of birth are read with the day first (`03/04/2010` is
the 3rd of April). A date that cannot be read leaves the three date fields empty.

## Running

```bash
testsheets --course bronze_cross -i roster.csv -o filled_forms/
```

One document is written per group of candidates (13 for the bronze sheets, 10 for the first
aid sheets). The output is a FDF file per document, to be merged into the fillable PDF with any
FDF-aware tool (`pdftk template.pdf fill_form Bronze_Cross_Test_Sheet_1.fdf output out.pdf`).
With `--output-format json`, the fields are written as JSON instead.

To find out which box a field name refers to, use `--debug-names`: every form field of the
template receives its own name. `--list-fields` prints the field names of every slot, marks the
ones the template does not have, and lists the form fields that no slot fills. A field missing
from the template is also reported as a warning on every run.

## Configuration file

```json
{
  "course": "emergency_first_aid",
  "outputSettings": { "outputDirectory": "filled_forms", "outputFormat": "fdf", "yearFormat": "4" },
  "rosterSource": { "provider": "csv", "filePath": "roster.csv" },
  "host": {
    "host_name": "City of Markham",
    "facility_name": "Centennial C.C."
  },
  "courses": [
    { "key": "emergency_first_aid", "document": "95efa_on2014.pdf", "outputStem": "EFA_Test_Sheet" }
  ]
}
```

The year of birth is written with two digits unless `yearFormat` is `"4"`. The sheets of the
same family have not been consistent about this: check the printed sheet before choosing.

New layouts can be described in the `layouts` section:

```json
{
  "layouts": [
    {
      "name": "silver_cross",
      "labels": { "name": "Name", "street": "Address", "city": "City", "postal": "Postal",
                  "email": "Email", "phone": "Phone", "day": "Day", "month": "Month", "year": "Year" },
      "slots": [
        { "suffix": " 1" },
        { "suffix": " 2", "overrides": { "name": "2", "street": ["Address 2", "Address 2X"] } }
      ]
    }
  ]
}
```

*/
